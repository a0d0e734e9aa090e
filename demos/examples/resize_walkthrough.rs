// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walk a board and a handful of controls through a series of viewports.
//!
//! Each step resizes the in-memory surface, lets the debounce window pass,
//! and prints the chosen strategy, the board rectangle, and any scroll region.
//!
//! Run:
//! - `cargo run -p easel_demos --example resize_walkthrough`
//! - `RUST_LOG=easel_viewport=debug,easel_layout=debug cargo run -p easel_demos --example resize_walkthrough`

use easel_scroll::ScrollAlign;
use easel_surface::{Attachments, BoxSurface, HostTime, Surface};
use easel_viewport::{CoordinatorConfig, ViewportCoordinator};
use kurbo::{Rect, Size};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut surface = BoxSurface::new(Size::new(1920.0, 1080.0));
    let board = surface.insert_host(
        Rect::new(0.0, 0.0, 800.0, 800.0),
        Attachments {
            handlers: 4,
            accessible_label: Some("Game board".into()),
            theme_classes: vec!["board".into()],
        },
    );
    let labels = ["New game", "Undo", "Redo", "Hint", "Settings", "Help"];
    let controls: Vec<_> = labels
        .iter()
        .map(|label| {
            surface.insert_host(
                Rect::new(0.0, 0.0, 180.0, 52.0),
                Attachments {
                    handlers: 1,
                    accessible_label: Some((*label).into()),
                    theme_classes: vec!["button".into()],
                },
            )
        })
        .collect();

    let mut coordinator =
        ViewportCoordinator::new(surface, Some(board), controls.clone(), CoordinatorConfig::default());
    coordinator
        .initialize(HostTime(0))
        .expect("fresh coordinator initializes");
    report(&coordinator, "initial");

    let mut now = 0;
    for (width, height) in [
        (1280.0, 800.0),
        (800.0, 1280.0),
        (390.0, 844.0),
        (390.0, 600.0),
        (2560.0, 720.0),
        (1920.0, 1080.0),
    ] {
        now += 1000;
        coordinator
            .surface_mut()
            .set_viewport_size(Size::new(width, height));
        coordinator
            .handle_resize(width, height, HostTime(now))
            .expect("coordinator is running");
        settle(&mut coordinator, &mut now);
        report(&coordinator, &format!("{width}x{height}"));

        if let Some(region) = coordinator.get_state().regions.first() {
            let last = *region.elements.last().expect("regions are never empty");
            now += 16;
            let offset = coordinator.scroll_element_into_view(last, ScrollAlign::End, HostTime(now));
            println!("    scrolled last control into view, offset {offset:?}");
        }
    }

    let state = coordinator.get_state();
    tracing::info!(
        analyses = state.analyses,
        coalesced = state.coalesced_requests,
        hit_rate = state.cache.hit_rate(),
        errors = state.errors.total(),
        "walkthrough finished"
    );
    coordinator.destroy();
}

fn settle(coordinator: &mut ViewportCoordinator<BoxSurface>, now: &mut u64) {
    while let Some(due) = coordinator.next_deadline() {
        *now = (*now).max(due.0);
        coordinator.tick(HostTime(*now)).expect("coordinator is running");
    }
}

fn report(coordinator: &ViewportCoordinator<BoxSurface>, step: &str) {
    let state = coordinator.get_state();
    let Some(plan) = &state.plan else {
        println!("{step}: no plan");
        return;
    };
    let board = coordinator
        .board()
        .and_then(|b| coordinator.surface().bounds(b));
    println!(
        "{step}: {:?} (band {:?}), board {:?}, {} controls, {} scroll region(s)",
        plan.strategy,
        state.band,
        board,
        plan.element_positions.len(),
        state.regions.len(),
    );
    for region in &state.regions {
        println!(
            "    region {:?}: {} controls, offset {:.1}, indicators {:?}",
            region.id,
            region.elements.len(),
            region.offset,
            region.indicators,
        );
    }
}
