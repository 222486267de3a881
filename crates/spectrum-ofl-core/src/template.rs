//! Template channel expansion for matrix inserts

/// Token replaced with the current pixel key in template channel names
pub const PIXEL_KEY_PLACEHOLDER: &str = "$pixelKey";

/// Expand template channels across pixel keys
///
/// Output is pixel-major: every template for the first pixel, then every
/// template for the second pixel, and so on. This order is the DMX channel
/// order of the fixture and must not change.
pub fn resolve_template_channels<T, K>(templates: &[T], pixel_keys: &[K]) -> Vec<String>
where
    T: AsRef<str>,
    K: AsRef<str>,
{
    pixel_keys
        .iter()
        .flat_map(|key| {
            templates
                .iter()
                .map(move |template| template.as_ref().replace(PIXEL_KEY_PLACEHOLDER, key.as_ref()))
        })
        .collect()
}
