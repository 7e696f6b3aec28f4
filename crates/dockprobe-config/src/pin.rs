//! 引脚描述
//!
//! 格式：`[^|~][!][chip:]name`
//!
//! - `^`: 上拉
//! - `~`: 下拉
//! - `!`: 反相（由传感器驱动层应用）
//! - `chip:`: 可选的控制板前缀，缺省为主控板

use crate::error::ConfigError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 上拉/下拉设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPull {
    #[default]
    None,
    Up,
    Down,
}

/// 数字输入引脚描述
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PinSpec {
    /// 控制板名称（`None` 表示主控板）
    pub chip: Option<String>,
    /// 引脚名称
    pub name: String,
    /// 是否反相
    pub invert: bool,
    /// 上拉/下拉
    pub pull: PinPull,
}

impl PinSpec {
    /// 创建主控板上的普通引脚
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            chip: None,
            name: name.into(),
            invert: false,
            pull: PinPull::None,
        }
    }

    /// 设置反相
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// 解析引脚描述
    ///
    /// # 错误
    ///
    /// 空名称、重复修饰符或同时上拉下拉时返回 `ConfigError::InvalidPin`。
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidPin {
            pin: text.to_string(),
            reason,
        };

        let mut rest = text.trim();
        let mut pull = PinPull::None;
        let mut invert = false;

        loop {
            match rest.chars().next() {
                Some('^') | Some('~') => {
                    if pull != PinPull::None {
                        return Err(invalid("only one of '^' or '~' may be given"));
                    }
                    pull = if rest.starts_with('^') { PinPull::Up } else { PinPull::Down };
                    rest = &rest[1..];
                },
                Some('!') => {
                    if invert {
                        return Err(invalid("duplicate '!' modifier"));
                    }
                    invert = true;
                    rest = &rest[1..];
                },
                _ => break,
            }
        }

        let (chip, name) = match rest.split_once(':') {
            Some((chip, name)) => {
                if chip.trim().is_empty() {
                    return Err(invalid("empty chip name"));
                }
                (Some(chip.trim().to_string()), name.trim())
            },
            None => (None, rest.trim()),
        };

        if name.is_empty() {
            return Err(invalid("empty pin name"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("pin name contains whitespace"));
        }

        Ok(Self {
            chip,
            name: name.to_string(),
            invert,
            pull,
        })
    }
}

impl FromStr for PinSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pull {
            PinPull::Up => f.write_str("^")?,
            PinPull::Down => f.write_str("~")?,
            PinPull::None => {},
        }
        if self.invert {
            f.write_str("!")?;
        }
        if let Some(chip) = &self.chip {
            write!(f, "{}:", chip)?;
        }
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_pin() {
        let pin = PinSpec::parse("PB7").unwrap();
        assert_eq!(pin.name, "PB7");
        assert_eq!(pin.chip, None);
        assert!(!pin.invert);
        assert_eq!(pin.pull, PinPull::None);
    }

    #[test]
    fn test_parse_modifiers_and_chip() {
        let pin = PinSpec::parse("^!toolboard:PA1").unwrap();
        assert_eq!(pin.chip.as_deref(), Some("toolboard"));
        assert_eq!(pin.name, "PA1");
        assert!(pin.invert);
        assert_eq!(pin.pull, PinPull::Up);
        assert_eq!(pin.to_string(), "^!toolboard:PA1");

        let pin: PinSpec = "~PC3".parse().unwrap();
        assert_eq!(pin.pull, PinPull::Down);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PinSpec::parse("").is_err());
        assert!(PinSpec::parse("^!").is_err());
        assert!(PinSpec::parse("^~PA1").is_err());
        assert!(PinSpec::parse("!!PA1").is_err());
        assert!(PinSpec::parse(":PA1").is_err());
        assert!(PinSpec::parse("P A1").is_err());
    }

    #[test]
    fn test_builder_helpers() {
        let pin = PinSpec::new("dock").inverted();
        assert!(pin.invert);
        assert_eq!(pin.to_string(), "!dock");
    }
}
