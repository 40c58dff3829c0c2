//! Strategies shipped with the application.

use super::{Registry, SourceDocument};
use std::sync::{Arc, OnceLock};

/// `(id, display name, file name, markup)` for every bundled strategy.
const BUNDLED: &[(&str, &str, &str, &str)] = &[
    (
        "auto_102_lecture_advice",
        "AUTO 102 BY LECTURE ADVICE",
        "auto_102_lecture_advice.xml",
        include_str!("bundled/auto_102_lecture_advice.xml"),
    ),
    (
        "even_odd_trader",
        "EVEN ODD TRADER BOT",
        "even_odd_trader.xml",
        include_str!("bundled/even_odd_trader.xml"),
    ),
    (
        "even_even_odd_odd",
        "EVEN EVEN ODD ODD BOT",
        "even_even_odd_odd.xml",
        include_str!("bundled/even_even_odd_odd.xml"),
    ),
    (
        "odd_odd_even_even",
        "ODD ODD EVEN EVEN BOT",
        "odd_odd_even_even.xml",
        include_str!("bundled/odd_odd_even_even.xml"),
    ),
    (
        "over_destroyer_mikeg",
        "OVER DESTROYER BY MIKE G",
        "over_destroyer_mikeg.xml",
        include_str!("bundled/over_destroyer_mikeg.xml"),
    ),
    (
        "the_lecture_speedbot",
        "The Lecture Speedbot V1",
        "the_lecture_speedbot.xml",
        include_str!("bundled/the_lecture_speedbot.xml"),
    ),
    (
        "stake_list_101",
        "Stake List 101",
        "stake_list_101.xml",
        include_str!("bundled/stake_list_101.xml"),
    ),
];

static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// Source documents for every bundled strategy, in catalog order.
pub fn sources() -> Vec<SourceDocument> {
    BUNDLED
        .iter()
        .map(|(id, name, file, markup)| {
            SourceDocument::new(*file, *markup)
                .with_id(*id)
                .with_name(*name)
        })
        .collect()
}

/// The process-wide bundled registry, built on first use.
pub fn registry() -> Arc<Registry> {
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(Registry::build(sources()))))
}
