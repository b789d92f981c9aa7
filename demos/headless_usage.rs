//! Minimal embedding example for tether-core
//!
//! This example drives a handful of bindings against the in-memory
//! platform, the way a host framework would: it owns the platform,
//! mounts bindings, feeds events and reads state back.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_core::bindings::{ClickOutside, ClipboardBinding, Debounced, LocalStorage, Update};
use tether_core::platform::MemoryPlatform;
use tether_core::storage::FileStorage;
use tether_core::traits::{EventKind, Node};
use tether_core::{Mount, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    theme: String,
    launches: u32,
}

fn click_outside(memory: &MemoryPlatform) -> Result<()> {
    let menu = memory.dom.create_element(None);
    let item = memory.dom.create_element(Some(menu.id()));

    let closes = Rc::new(Cell::new(0));
    let counter = closes.clone();
    let binding = ClickOutside::new(
        &memory.platform(),
        move |_| counter.set(counter.get() + 1),
        None,
    );
    binding.node_ref().set(Some(menu.handle()));
    let _menu = Mount::new(binding)?;

    memory.dom.dispatch(EventKind::MouseDown, Some(item.id()));
    memory.dom.dispatch(EventKind::MouseDown, Some(memory.dom.body().id()));
    println!("[ClickOutside] menu closed {} time(s)", closes.get());
    Ok(())
}

fn preferences(memory: &MemoryPlatform) -> Result<()> {
    let path = std::env::temp_dir().join("tether-headless-usage.json");
    let storage = Rc::new(FileStorage::open(&path)?);
    let platform = memory.platform().with_local_storage(storage);

    let prefs = Mount::new(LocalStorage::new(&platform, "prefs", Preferences::default()))?;
    prefs.setter().set(Update::with(|prefs: &Preferences| Preferences {
        theme: "dark".to_string(),
        launches: prefs.launches + 1,
    }));
    println!(
        "[LocalStorage] {:?} persisted to {}",
        prefs.get(),
        path.display()
    );
    Ok(())
}

async fn search(memory: &MemoryPlatform) -> Result<()> {
    let mut query = Mount::new(Debounced::new(
        &memory.platform(),
        String::new(),
        Some(Duration::from_millis(200)),
    ))?;
    for typed in ["t", "te", "tet", "tether"] {
        query.set_input(typed.to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    println!("[Debounced] while typing: {:?}", query.get());
    tokio::time::sleep(Duration::from_millis(250)).await;
    println!("[Debounced] after a pause: {:?}", query.get());
    Ok(())
}

async fn clipboard(memory: &MemoryPlatform) -> Result<()> {
    let binding = Mount::new(ClipboardBinding::new(&memory.platform()))?;
    let copied = binding.copy("tether").await;
    println!(
        "[Clipboard] copied={} flag={} contents={:?}",
        copied,
        binding.is_copied(),
        memory.clipboard.contents()
    );
    Ok(())
}

fn main() -> Result<()> {
    let log_level = match std::env::var("TETHER_LOG").as_deref() {
        Ok("trace") => Level::TRACE,
        Ok("info") => Level::INFO,
        Ok("warn") => Level::WARN,
        Ok("error") => Level::ERROR,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    println!("=== Embedded tether-core Example ===\n");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async {
        let memory = MemoryPlatform::new();
        click_outside(&memory)?;
        preferences(&memory)?;
        search(&memory).await?;
        clipboard(&memory).await?;
        println!("\n=== Example Complete ===");
        Ok::<(), tether_core::Error>(())
    })
}
