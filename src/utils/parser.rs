use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::f64::consts::{LN_10, LN_2, PI};
static MAGIC_NUMBER: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)^(pi|db|cent|semitone|octave|sqrt|ln|exp)(.*)$"));
fn parse_plain(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| anyhow!("Invalid number '{}': {}", s, e))
}
/// Parses a double, also accepting the magic strings `pi`, `db`, `cent`,
/// `semitone`, `octave` and the prefixes `sqrtX`, `lnX`, `expX`.
pub fn parse_number(arg: &str) -> Result<f64> {
    let arg = arg.trim();
    let re = MAGIC_NUMBER.as_ref().map_err(|e| anyhow!("Invalid pattern: {}", e))?;
    let Some(cap) = re.captures(arg) else {
        return parse_plain(arg);
    };
    let name = cap[1].to_lowercase();
    let rest = &cap[2];
    match (name.as_str(), rest.is_empty()) {
        ("pi", true) => Ok(PI),
        ("db", true) => Ok(20.0 / LN_10),
        ("cent", true) => Ok(1200.0 / LN_2),
        ("semitone", true) => Ok(12.0 / LN_2),
        ("octave", true) => Ok(1.0 / LN_2),
        ("sqrt", false) => {
            let x = parse_number(rest)?;
            if x < 0.0 {
                return Err(anyhow!("sqrt of negative number: {}", x));
            }
            Ok(x.sqrt())
        }
        ("ln", false) => {
            let x = parse_number(rest)?;
            if x <= 0.0 {
                return Err(anyhow!("ln of non-positive number: {}", x));
            }
            Ok(x.ln())
        }
        ("exp", false) => Ok(parse_number(rest)?.exp()),
        _ => Err(anyhow!("Invalid number '{}'", arg)),
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_plain() -> Result<()> {
        assert_eq!(parse_number("0.35")?, 0.35);
        assert_eq!(parse_number("-1e-3")?, -1e-3);
        assert_eq!(parse_number(" 16 ")?, 16.0);
        Ok(())
    }
    #[test]
    fn test_constants() -> Result<()> {
        assert_eq!(parse_number("pi")?, PI);
        assert_eq!(parse_number("PI")?, PI);
        assert!((parse_number("dB")? - 8.685889638065035).abs() < 1e-12);
        assert!((parse_number("cent")? - 1731.2340490667560).abs() < 1e-9);
        assert!((parse_number("semitone")? - 17.312340490667560).abs() < 1e-12);
        assert!((parse_number("octave")? - 1.4426950408889634).abs() < 1e-15);
        Ok(())
    }
    #[test]
    fn test_prefixes() -> Result<()> {
        assert_eq!(parse_number("sqrt4")?, 2.0);
        assert!(parse_number("ln1")?.abs() < 1e-15);
        assert!((parse_number("exp1")? - std::f64::consts::E).abs() < 1e-15);
        assert!((parse_number("sqrtpi")? - PI.sqrt()).abs() < 1e-15);
        Ok(())
    }
    #[test]
    fn test_invalid() {
        assert!(parse_number("ln0").is_err());
        assert!(parse_number("ln-2").is_err());
        assert!(parse_number("sqrt").is_err());
        assert!(parse_number("pix").is_err());
        assert!(parse_number("abc").is_err());
        assert!(parse_number("").is_err());
    }
}
