// src/catalog.rs
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::errors::{AppError, Result};
use crate::models::{SubscriptionTier, VideoStyle};

const PRICING_TOML: &str = include_str!("pricing.toml");

/// Selectable video lengths in seconds.
pub const DURATIONS: [u32; 4] = [8, 15, 30, 60];

/// Monthly price of a tier. Enterprise is quoted per customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Monthly(u32),
    Quote(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PricingTier {
    pub name: String,
    pub price: Price,
    pub videos_per_month: u32,
    /// Longest video this tier may order, in seconds.
    pub max_duration: u32,
    pub quality: String,
    pub support: String,
    pub features: Vec<String>,
    #[serde(default)]
    pub popular: bool,
}

impl PricingTier {
    pub fn allows_duration(&self, seconds: u32) -> bool {
        seconds > 0 && seconds <= self.max_duration
    }

    /// Subscription tier this pricing entry sells.
    pub fn tier(&self) -> Option<SubscriptionTier> {
        match self.name.to_lowercase().as_str() {
            "starter" => Some(SubscriptionTier::Starter),
            "professional" => Some(SubscriptionTier::Professional),
            "business" => Some(SubscriptionTier::Business),
            "enterprise" => Some(SubscriptionTier::Enterprise),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct PricingFile {
    tiers: Vec<PricingTier>,
}

/// Parses a pricing table in the embedded TOML layout.
pub fn parse_pricing(source: &str) -> Result<Vec<PricingTier>> {
    let file: PricingFile = toml::from_str(source)?;
    Ok(file.tiers)
}

type TierCache = OnceLock<std::result::Result<Vec<PricingTier>, String>>;

/// The static pricing table shipped with the binary.
pub fn pricing_tiers() -> Result<&'static [PricingTier]> {
    static TIERS: TierCache = OnceLock::new();
    load_cached(&TIERS, PRICING_TOML)
}

/// Parses `source` once into `cache`. A parse failure is cached too and
/// reported on every call.
fn load_cached(cache: &'static TierCache, source: &str) -> Result<&'static [PricingTier]> {
    let loaded = cache.get_or_init(|| {
        parse_pricing(source).map_err(|e| {
            log::error!("Pricing table is invalid: {}", e);
            e.to_string()
        })
    });
    match loaded {
        Ok(tiers) => Ok(tiers.as_slice()),
        Err(message) => Err(AppError::Catalog(message.clone())),
    }
}

pub fn find_tier(tier: SubscriptionTier) -> Option<&'static PricingTier> {
    pricing_tiers().ok()?.iter().find(|t| t.tier() == Some(tier))
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectOption<V> {
    pub value: V,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub video_styles: Vec<SelectOption<VideoStyle>>,
    pub durations: Vec<SelectOption<u32>>,
}

pub fn form_options() -> FormOptions {
    FormOptions {
        video_styles: VideoStyle::ALL
            .iter()
            .map(|style| SelectOption {
                value: *style,
                label: style.label().to_string(),
            })
            .collect(),
        durations: DURATIONS
            .iter()
            .map(|seconds| SelectOption {
                value: *seconds,
                label: format!("{} seconds", seconds),
            })
            .collect(),
    }
}
