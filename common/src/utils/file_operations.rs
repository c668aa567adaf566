use anyhow::Error;

pub const JWT_SECRET_LENGTH: usize = 32;

/// Reads a hex encoded JWT secret from a file.
///
/// A `0x` prefix and surrounding whitespace are allowed.
pub fn read_jwt_secret(file_path: &str) -> Result<[u8; JWT_SECRET_LENGTH], Error> {
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| anyhow::anyhow!("Failed to read JWT secret file {file_path}: {e}"))?;
    parse_jwt_secret(&content)
        .map_err(|e| anyhow::anyhow!("Invalid JWT secret in {file_path}: {e}"))
}

fn parse_jwt_secret(content: &str) -> Result<[u8; JWT_SECRET_LENGTH], Error> {
    let trimmed = content.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_str).map_err(|e| anyhow::anyhow!("not valid hex: {e}"))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        anyhow::anyhow!(
            "expected {} bytes, got {}",
            JWT_SECRET_LENGTH,
            bytes.len()
        )
    })
}
