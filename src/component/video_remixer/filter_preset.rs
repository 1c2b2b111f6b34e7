//! 色彩濾鏡預設
//!
//! 每個預設對應一段 ffmpeg 視訊濾鏡字串，`random` 每次呼叫都會重新抽樣

use super::error::RemixError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const BRIGHTNESS_RANGE: RangeInclusive<f64> = -0.01..=0.10;
pub const CONTRAST_RANGE: RangeInclusive<f64> = 0.99..=1.01;
pub const COLOR_BALANCE_RANGE: RangeInclusive<f64> = -0.01..=0.10;
pub const BLUR_SIGMA_RANGE: RangeInclusive<f64> = 0.0..=0.10;

const SEPIA_FILTER: &str = "colorchannelmixer=.393:.769:.189:.349:.686:.168:.272:.534:.131";
const BRIGHTNESS_FILTER: &str = "eq=brightness=0.01";
const BLUR_FILTER: &str = "gblur=sigma=0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    #[default]
    Random,
    SlightSepia,
    SlightBrightness,
    SlightBlur,
}

/// `random` 預設抽出的參數
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomFilterParams {
    pub brightness: f64,
    pub contrast: f64,
    pub red_shift: f64,
    pub green_shift: f64,
    pub blue_shift: f64,
    pub blur_sigma: f64,
}

impl RandomFilterParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            brightness: rng.gen_range(BRIGHTNESS_RANGE),
            contrast: rng.gen_range(CONTRAST_RANGE),
            red_shift: rng.gen_range(COLOR_BALANCE_RANGE),
            green_shift: rng.gen_range(COLOR_BALANCE_RANGE),
            blue_shift: rng.gen_range(COLOR_BALANCE_RANGE),
            blur_sigma: rng.gen_range(BLUR_SIGMA_RANGE),
        }
    }

    #[must_use]
    pub fn to_filter(&self) -> String {
        format!(
            "eq=brightness={}:contrast={},colorbalance=rs={}:gs={}:bs={},gblur=sigma={}",
            self.brightness,
            self.contrast,
            self.red_shift,
            self.green_shift,
            self.blue_shift,
            self.blur_sigma
        )
    }
}

impl FilterPreset {
    pub const ALL: [Self; 4] = [
        Self::Random,
        Self::SlightSepia,
        Self::SlightBrightness,
        Self::SlightBlur,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::SlightSepia => "slight_sepia",
            Self::SlightBrightness => "slight_brightness",
            Self::SlightBlur => "slight_blur",
        }
    }

    /// 產生 ffmpeg 濾鏡字串，只有 `Random` 會使用亂數來源
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Self::Random => RandomFilterParams::sample(rng).to_filter(),
            Self::SlightSepia => SEPIA_FILTER.to_string(),
            Self::SlightBrightness => BRIGHTNESS_FILTER.to_string(),
            Self::SlightBlur => BLUR_FILTER.to_string(),
        }
    }
}

impl FromStr for FilterPreset {
    type Err = RemixError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == name.trim())
            .ok_or_else(|| RemixError::UnknownPreset(name.to_string()))
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
