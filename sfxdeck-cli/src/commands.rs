//! Command handlers.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use sfxdeck_core::add_flow::{AddOutcome, AddToListFlow, ChooserOptions};
use sfxdeck_core::catalog::{Sound, SoundQuery, Variant};
use sfxdeck_core::identity::{has_choice, option_label, PlaybackKey, SoundId, VariantId};
use sfxdeck_core::lists::{ListId, SessionList};
use sfxdeck_core::playback::PlaybackStatus;
use sfxdeck_core::routes::list_page;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::state::AppState;

/// Parses `5` or `5:9` into a playback key.
pub fn parse_key(raw: &str) -> Result<PlaybackKey> {
    let (sound, variant) = match raw.split_once(':') {
        Some((sound, variant)) => (sound, Some(variant)),
        None => (raw, None),
    };
    let sound = sound
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid sound id '{}'", sound))?;
    let variant = match variant {
        Some(v) => Some(
            v.trim()
                .parse::<u64>()
                .with_context(|| format!("invalid variant id '{}'", v))?,
        ),
        None => None,
    };
    Ok(PlaybackKey::new(SoundId(sound), variant.map(VariantId)))
}

fn pick_variant(sound: &Sound, variant: Option<VariantId>) -> Result<Option<&Variant>> {
    match variant {
        Some(id) => sound
            .variant(id)
            .map(Some)
            .ok_or_else(|| anyhow!("sound {} has no variant {}", sound.id, id)),
        None => Ok(None),
    }
}

fn print_list(list: &SessionList) {
    println!("{} [{}] {}", list.name, list.id, list_page(&list.id));
    if list.sounds.is_empty() {
        println!("  (empty)");
    }
    for (i, entry) in list.sounds.iter().enumerate() {
        println!("  {:>2}. {:<8} {}", i + 1, entry.key().to_string(), entry.display_name());
    }
}

fn print_sound(sound: &Sound) {
    println!("{:>6}  {:<32} {}", sound.id, sound.name, sound.category_label());
    if has_choice(sound) {
        for (i, variant) in sound.variants.iter().enumerate() {
            println!("        {}:{}  {}", sound.id, variant.id, option_label(variant, i));
        }
    }
}

pub async fn categories(state: &AppState) -> Result<()> {
    for category in state.catalog.categories().await? {
        println!("{:>4}  {:<24} {}", category.id, category.name, category.sound_count);
    }
    Ok(())
}

pub async fn sounds(state: &AppState, query: &SoundQuery) -> Result<()> {
    let sounds = state.catalog.sounds(query).await?;
    if sounds.is_empty() {
        println!("No sounds found.");
    }
    for sound in &sounds {
        print_sound(sound);
    }
    Ok(())
}

/// Plays one sound and waits until it ends or Ctrl-C is pressed.
pub async fn play(state: &mut AppState, key: PlaybackKey) -> Result<()> {
    let sound = state.catalog.sound(key.sound).await?;
    let variant = pick_variant(&sound, key.variant)?;
    let interval = Duration::from_millis(state.config.playback.poll_interval_ms);

    let coordinator = state.coordinator();
    coordinator.play(&sound, variant);
    if coordinator.state().is_idle() {
        bail!("could not play {}", sound.name);
    }
    println!("Playing {}", sound.name);

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                coordinator.poll();
                if coordinator.state().is_idle() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                coordinator.stop();
                break;
            }
        }
    }
    Ok(())
}

pub async fn lists(state: &AppState) -> Result<()> {
    let lists = state.store.list_all().await.map_err(|e| anyhow!(e.user_message()))?;
    if lists.is_empty() {
        println!("No session lists yet.");
    }
    for list in lists {
        println!("{:<16} {}", list.id, list.name);
    }
    Ok(())
}

pub async fn show(state: &AppState, id: &ListId) -> Result<()> {
    let list = state.store.get(id).await.map_err(|e| anyhow!(e.user_message()))?;
    print_list(&list);
    Ok(())
}

pub async fn create(state: &AppState, name: &str) -> Result<()> {
    let list = state
        .store
        .create_for_session(name)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    print_list(&list);
    Ok(())
}

pub async fn rename(state: &AppState, id: &ListId, name: &str) -> Result<()> {
    let list = state
        .store
        .rename(id, name)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    print_list(&list);
    Ok(())
}

pub async fn delete(state: &AppState, id: &ListId) -> Result<()> {
    state.store.delete(id).await.map_err(|e| anyhow!(e.user_message()))?;
    println!("Deleted {}", id);
    Ok(())
}

pub async fn add(state: &AppState, id: &ListId, key: PlaybackKey) -> Result<()> {
    let sound = state.catalog.sound(key.sound).await?;
    let variant = pick_variant(&sound, key.variant)?;
    let list = state
        .store
        .add_item(id, &sound, variant)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    print_list(&list);
    Ok(())
}

pub async fn remove(state: &AppState, id: &ListId, key: PlaybackKey) -> Result<()> {
    let list = state
        .store
        .remove_item(id, key.sound, key.variant)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    print_list(&list);
    Ok(())
}

pub async fn reorder(state: &AppState, id: &ListId, order: &[PlaybackKey]) -> Result<()> {
    let list = state
        .store
        .reorder(id, order)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    print_list(&list);
    Ok(())
}

const SHELL_HELP: &str = "\
commands:
  play <sound[:variant]>     start a sound, replacing the current one
  toggle                     pause or resume the current sound
  stop                       stop playback
  status                     show what is playing
  lists                      show session lists
  show <list>                show one list
  new <name>                 create a list
  add <sound[:variant]>      add to the pinned list, or pick one
  pick <n>                   choose list n from the open chooser
  remove <list> <sound[:variant]>
  quit";

/// Interactive session. Guest lists live until the shell exits.
pub async fn shell(state: &mut AppState, pinned: Option<ListId>) -> Result<()> {
    let interval = Duration::from_millis(state.config.playback.poll_interval_ms);
    let mut flow = AddToListFlow::new(state.store.clone(), pinned, sfxdeck_core::routes::BROWSE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(interval);
    let mut last_status = PlaybackStatus::Idle;

    println!("{}", SHELL_HELP);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let coordinator = state.coordinator();
                coordinator.poll();
                let status = coordinator.state().status;
                if status == PlaybackStatus::Idle && last_status != PlaybackStatus::Idle {
                    println!("(finished)");
                }
                last_status = status;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let words: Vec<&str> = line.split_whitespace().collect();
                match shell_command(state, &mut flow, &words).await {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => println!("error: {:#}", e),
                }
                last_status = state.coordinator().state().status;
            }
        }
    }
    state.coordinator().stop();
    Ok(())
}

async fn shell_command(state: &mut AppState, flow: &mut AddToListFlow, words: &[&str]) -> Result<bool> {
    match words {
        [] => {}
        ["quit"] | ["exit"] => return Ok(true),
        ["help"] => println!("{}", SHELL_HELP),
        ["play", key] => {
            let key = parse_key(key)?;
            let sound = state.catalog.sound(key.sound).await?;
            let variant = pick_variant(&sound, key.variant)?;
            state.coordinator().play(&sound, variant);
            status(state);
        }
        ["toggle"] => {
            let coordinator = state.coordinator();
            if let Some(key) = coordinator.state().active_key {
                coordinator.toggle(&key);
            }
            status(state);
        }
        ["stop"] => {
            state.coordinator().stop();
            status(state);
        }
        ["status"] => status(state),
        ["lists"] => lists(state).await?,
        ["show", id] => show(state, &ListId::parse(id)).await?,
        ["new", name @ ..] if !name.is_empty() => create(state, &name.join(" ")).await?,
        ["add", key] => {
            let key = parse_key(key)?;
            let sound = state.catalog.sound(key.sound).await?;
            let variant = pick_variant(&sound, key.variant)?.cloned();
            let outcome = flow.start(&sound, variant.as_ref()).await;
            report(outcome);
        }
        ["pick", n] => {
            let index: usize = n.parse().context("pick takes a list number")?;
            let selection = match flow.options() {
                Some(ChooserOptions::Lists(lists)) => index
                    .checked_sub(1)
                    .and_then(|i| lists.get(i))
                    .map(|l| l.id.clone()),
                _ => None,
            };
            let outcome = flow.confirm(selection.as_ref()).await;
            report(outcome);
        }
        ["remove", id, key] => remove(state, &ListId::parse(id), parse_key(key)?).await?,
        _ => println!("unknown command, try 'help'"),
    }
    Ok(false)
}

fn status(state: &mut AppState) {
    let playback = state.coordinator().state();
    match (playback.status, playback.active_key) {
        (PlaybackStatus::Idle, _) | (_, None) => println!("idle"),
        (PlaybackStatus::Playing, Some(key)) => println!("playing {}", key),
        (PlaybackStatus::Paused, Some(key)) => println!("paused {}", key),
    }
}

fn report(outcome: AddOutcome) {
    match outcome {
        AddOutcome::Added(list) => print_list(&list),
        AddOutcome::Choosing(ChooserOptions::Lists(lists)) => {
            println!("Add to which list? (pick <n>, or pick 0 to cancel)");
            for (i, list) in lists.iter().enumerate() {
                println!("  {}. {}", i + 1, list.name);
            }
        }
        AddOutcome::Choosing(ChooserOptions::CreateFirst(hint)) => {
            println!("{} (pick 0 to close)", hint)
        }
        AddOutcome::SignInRequired { redirect } => println!("Sign in required: {}", redirect),
        AddOutcome::Failed(message) => println!("{}", message),
        AddOutcome::Closed => println!("Closed"),
    }
}
