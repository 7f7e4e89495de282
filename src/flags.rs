use crate::error::ShellError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<&'static str, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: &'static str,
    pub long: &'static str,
    pub description: &'static str,
    pub takes_value: bool,
    pub value: Option<String>,
}

/// name, short, long, description, takes a value
const FLAG_TABLE: &[(&str, &str, &str, &str, bool)] = &[
    ("help", "-h", "--help", "Print this help message", false),
    ("version", "-v", "--version", "Show version information", false),
    ("config", "-c", "--config", "Read settings from this file instead of ~/.smallshrc", true),
    ("quiet", "-q", "--quiet", "Suppress interpreter warnings", false),
    ("debug", "-d", "--debug", "Write debug records to the log file", false),
];

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let flags = FLAG_TABLE
            .iter()
            .map(|&(name, short, long, description, takes_value)| {
                (
                    name,
                    Flag {
                        short,
                        long,
                        description,
                        takes_value,
                        value: None,
                    },
                )
            })
            .collect();
        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let flag = self
                .flags
                .values_mut()
                .find(|flag| arg == flag.short || arg == flag.long)
                .ok_or_else(|| ShellError::FlagError(format!("unknown flag {}", arg)))?;

            flag.value = if flag.takes_value {
                let value = args.next().ok_or_else(|| {
                    ShellError::FlagError(format!("Flag {} requires a value", arg))
                })?;
                Some(value.clone())
            } else {
                Some("true".to_string())
            };
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get_value(name).is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn print_help(&self) {
        println!("Usage: smallsh [OPTIONS]");
        println!("\nOptions:");
        for &(name, ..) in FLAG_TABLE {
            if let Some(flag) = self.flags.get(name) {
                let long = if flag.takes_value {
                    format!("{} <path>", flag.long)
                } else {
                    flag.long.to_string()
                };
                println!("  {}, {:<17} {}", flag.short, long, flag.description);
            }
        }
    }
}
