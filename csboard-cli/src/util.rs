use csboard::constants::CHANNEL_COUNT;

pub(crate) fn positive_f32(value: &str) -> Result<f32, String> {
    match value.parse::<f32>() {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(v),
        Ok(_) => Err(String::from("must be a positive number")),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse exactly one comma-separated value per channel.
pub(crate) fn offsets(value: &str) -> Result<[f32; CHANNEL_COUNT], String> {
    let parsed = value
        .split(',')
        .map(|s| s.trim().parse::<f32>().map_err(|e| format!("{s:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f32; CHANNEL_COUNT]>::try_from(parsed)
        .map_err(|v| format!("expected {CHANNEL_COUNT} offsets, found {}", v.len()))
}
