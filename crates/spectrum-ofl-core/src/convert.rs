//! OFL to Spectrum conversion
//!
//! Conversion is best effort. Channels are copied with their capabilities
//! untouched, and mode channel lists are flattened to plain names. Nothing
//! here fails: unrecognized shapes degrade to empty values.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::normalized_value;
use crate::ofl::{ModeChannel, SourceChannel, SourceFixture, SourceMode};
use crate::spectrum::{Channel, FixtureInfo, Mode, SpectrumFixture};
use crate::template::resolve_template_channels;

/// Tunables for a single conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Flatten every channel's capabilities into a list of objects
    #[serde(default)]
    pub normalize_capabilities: bool,
}

/// Convert an OFL fixture into a Spectrum manifest
///
/// Callers are expected to have filtered out matrix fixtures with
/// [`crate::matrix::has_matrix`] first; pixel-matrix inserts are still
/// expanded here if one slips through.
pub fn convert_fixture(fixture: &SourceFixture, options: &ConvertOptions) -> SpectrumFixture {
    let mut converted = SpectrumFixture::new(fixture_info(fixture));

    converted.channels = fixture
        .available_channels
        .iter()
        .map(|(name, channel)| (name.clone(), convert_channel(channel, options)))
        .collect();

    converted.modes = fixture
        .modes
        .iter()
        .map(|mode| convert_mode(mode, fixture.pixel_keys()))
        .collect();

    converted
}

/// Build the manifest `info` block
pub fn fixture_info(fixture: &SourceFixture) -> FixtureInfo {
    FixtureInfo {
        name: fixture.name.clone(),
        brand: fixture.manufacturer_key.clone(),
        website: fixture.ofl_url.clone(),
        videos: Vec::new(),
        date: fixture.meta.last_modify_date.clone(),
        author: fixture.meta.authors.join(", "),
        oflurl: fixture.ofl_url.clone(),
        categories: fixture.categories.clone(),
    }
}

fn convert_channel(channel: &SourceChannel, options: &ConvertOptions) -> Channel {
    let raw = channel.capabilities.raw();
    let capabilities = if options.normalize_capabilities {
        normalized_value(&raw)
    } else {
        raw
    };
    Channel { capabilities }
}

/// Flatten one mode's channel list
pub fn convert_mode(mode: &SourceMode, pixel_keys: &[String]) -> Mode {
    let mut channels = Vec::with_capacity(mode.channels.len());

    for entry in &mode.channels {
        match entry {
            ModeChannel::Named(name) => channels.push(name.clone()),
            ModeChannel::PixelMatrix { template_channels } => {
                channels.extend(resolve_template_channels(template_channels.as_slice(), pixel_keys));
            }
            // TODO: other insert kinds collapse to a single entry, which shifts the DMX
            // offsets of every following channel in the mode.
            ModeChannel::Directive { insert, name } => {
                debug!(
                    mode = %mode.name,
                    insert = insert.as_deref().unwrap_or("none"),
                    "Insert directive converted to a single named channel"
                );
                channels.push(name.clone());
            }
            ModeChannel::Other => {}
        }
    }

    Mode {
        name: mode.name.clone(),
        short_name: mode.short_name.clone(),
        channels,
    }
}
