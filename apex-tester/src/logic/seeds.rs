use anyhow::{Result, bail};

/// Resolve CLI seed tokens into numeric seeds.
///
/// Accepts decimal integers (negative values use their magnitude) and
/// `0x`-prefixed hex. Duplicates are dropped, first occurrence wins.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            match u64::from_str_radix(hex, 16) {
                Ok(value) => value,
                Err(_) => bail!("invalid hex seed: {token}"),
            }
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("invalid seed: {token}");
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("no seeds provided");
    }
    Ok(seeds)
}
