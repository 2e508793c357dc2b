//! Directive log header of a written compose file
//!
//! The first line holds the instance count, every following line one raw
//! script directive, each prefixed with [`LOG_MARKER`]. YAML treats these lines
//! as comments, so the file stays a valid compose document. This header is the
//! only record of the count and scripts a later replay can use.

use super::assembler::{validate_num, Assembly, DocumentAssembler};
use super::config::{FinalDocument, OverrideConfig, Settings};
use super::expand::expand_script;
use crate::error::{DupError, Result};
use crate::template::directive::Directive;
use std::path::Path;

/// Prefix of every header line
pub const LOG_MARKER: char = '#';

/// Instance count and raw script directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveLog {
    pub num: u32,
    pub scripts: Vec<String>,
}

impl DirectiveLog {
    /// Create a log
    pub fn new(num: u32, scripts: Vec<String>) -> Self {
        Self { num, scripts }
    }

    /// Render the header followed by the document body
    pub fn encode(&self, document: &FinalDocument) -> Result<String> {
        let mut out = format!("{}{}\n", LOG_MARKER, self.num);
        for (i, script) in self.scripts.iter().enumerate() {
            if script.contains('\n') {
                return Err(DupError::DirectiveLog {
                    line: i + 1,
                    message: "scripts cannot span multiple lines".to_string(),
                });
            }
            out.push(LOG_MARKER);
            out.push_str(script);
            out.push('\n');
        }
        out.push_str(&document.to_yaml()?);
        Ok(out)
    }

    /// Read the header of a previously written compose file
    ///
    /// Reading stops at the first line without the marker.
    pub fn decode(content: &str) -> Result<Self> {
        let mut lines = content.lines();

        let first = lines.next().ok_or_else(|| DupError::DirectiveLog {
            line: 0,
            message: "file is empty".to_string(),
        })?;
        let count = first
            .strip_prefix(LOG_MARKER)
            .ok_or_else(|| DupError::DirectiveLog {
                line: 0,
                message: "missing instance count header".to_string(),
            })?;
        let num = count
            .trim()
            .parse::<i64>()
            .map_err(|e| DupError::DirectiveLog {
                line: 0,
                message: format!("invalid instance count '{}': {}", count, e),
            })
            .and_then(|n| {
                validate_num(n).map_err(|e| DupError::DirectiveLog {
                    line: 0,
                    message: e.to_string(),
                })
            })?;

        let scripts = lines
            .map_while(|line| line.strip_prefix(LOG_MARKER))
            .map(str::to_string)
            .collect();

        Ok(Self { num, scripts })
    }

    /// Shell commands in replay order
    pub fn commands<'a>(
        &'a self,
        variables: &'a [(String, String)],
    ) -> impl Iterator<Item = String> + 'a {
        let num = self.num;
        self.scripts
            .iter()
            .flat_map(move |raw| expand_script(&Directive::parse(raw), variables, num))
    }
}

impl From<&Assembly> for DirectiveLog {
    fn from(assembly: &Assembly) -> Self {
        Self::new(assembly.num, assembly.scripts.clone())
    }
}

/// Write an assembled document with its directive log header
pub fn write_compose(path: &Path, assembly: &Assembly) -> Result<()> {
    let content = DirectiveLog::from(assembly).encode(&assembly.document)?;
    std::fs::write(path, content)?;
    tracing::info!(
        "Wrote {} services and {} networks to {}",
        assembly.document.services.len(),
        assembly.document.networks.len(),
        path.display()
    );
    Ok(())
}

/// Expand an override file against the settings and write the compose file
///
/// The override is loaded and the whole document assembled before the
/// compose file is touched, so a missing override or a bad count leaves any
/// previous compose file as it was.
pub fn expand_to_file(
    settings: &Settings,
    override_file: &Path,
    num: i64,
    compose_file: &Path,
) -> Result<Assembly> {
    let overrides = OverrideConfig::load(override_file)?;
    let assembly = DocumentAssembler::new(settings).assemble(&overrides, num)?;
    write_compose(compose_file, &assembly)?;
    Ok(assembly)
}

/// Read the directive log from a written compose file
pub fn read_log(path: &Path) -> Result<DirectiveLog> {
    let content = std::fs::read_to_string(path)?;
    DirectiveLog::decode(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_commands() {
        let log = DirectiveLog::new(2, vec!["echo hi".to_string(), "d%echo _num_".to_string()]);
        let written = log.encode(&FinalDocument::new("3.7")).unwrap();
        assert!(written.starts_with("#2\n#echo hi\n#d%echo _num_\nversion:"));

        let decoded = DirectiveLog::decode(&written).unwrap();
        assert_eq!(decoded, log);
        let commands: Vec<String> = decoded.commands(&[]).collect();
        assert_eq!(commands, vec!["echo hi", "echo 1", "echo 2"]);
    }

    #[test]
    fn test_two_digit_count() {
        let written = DirectiveLog::new(12, vec!["d%echo _num-l_".to_string()])
            .encode(&FinalDocument::new("3.7"))
            .unwrap();
        let decoded = DirectiveLog::decode(&written).unwrap();
        assert_eq!(decoded.num, 12);

        let commands: Vec<String> = decoded.commands(&[]).collect();
        assert_eq!(commands.len(), 12);
        assert_eq!(commands[0], "echo 01");
        assert_eq!(commands[11], "echo 12");
    }

    #[test]
    fn test_decode_stops_at_body() {
        let content = "#1\n#echo a\nversion: '3.7'\n#not a script\n";
        let log = DirectiveLog::decode(content).unwrap();
        assert_eq!(log.scripts, vec!["echo a".to_string()]);
    }

    #[test]
    fn test_missing_header() {
        let content = "version: '3.7'\nservices: {}\n";
        assert!(matches!(
            DirectiveLog::decode(content),
            Err(DupError::DirectiveLog { line: 0, .. })
        ));
        assert!(DirectiveLog::decode("").is_err());
        assert!(DirectiveLog::decode("#abc\n").is_err());
        assert!(DirectiveLog::decode("#0\n").is_err());
    }

    #[test]
    fn test_multiline_script_rejected() {
        let log = DirectiveLog::new(1, vec!["echo a\necho b".to_string()]);
        assert!(log.encode(&FinalDocument::new("3.7")).is_err());
    }

    #[test]
    fn test_written_file_is_valid_compose() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docker-compose.yml");

        let mut document = FinalDocument::new("3.7");
        document.services.insert(
            serde_yaml::Value::String("web-1".to_string()),
            serde_yaml::from_str("image: nginx").unwrap(),
        );
        let assembly = Assembly {
            document: document.clone(),
            scripts: vec!["d%echo _num_".to_string()],
            num: 1,
        };
        write_compose(&path, &assembly).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reparsed: FinalDocument = serde_yaml::from_str(&content).unwrap();
        assert_eq!(reparsed, document);
        assert_eq!(read_log(&path).unwrap(), DirectiveLog::from(&assembly));
    }

    fn setup() -> (tempfile::TempDir, Settings) {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("run.yml"),
            "services:\n  d%web:\n    image: nginx\nscripts:\n  - d%echo _num_\n",
        )
        .unwrap();
        let settings = Settings::parse_str("version: '3.7'\nimage_dir: ./\n").unwrap();
        (temp, settings)
    }

    #[test]
    fn test_expand_to_file() {
        let (temp, settings) = setup();
        let compose = temp.path().join("docker-compose.yml");

        let assembly = expand_to_file(&settings, &temp.path().join("run.yml"), 2, &compose).unwrap();
        assert_eq!(assembly.document.service_names(), vec!["web-1", "web-2"]);

        let log = read_log(&compose).unwrap();
        let commands: Vec<String> = log.commands(&[]).collect();
        assert_eq!(commands, vec!["echo 1", "echo 2"]);
    }

    #[test]
    fn test_out_of_range_num_writes_nothing() {
        let (temp, settings) = setup();
        let compose = temp.path().join("docker-compose.yml");

        for num in [0, 100] {
            let result = expand_to_file(&settings, &temp.path().join("run.yml"), num, &compose);
            assert!(matches!(result, Err(DupError::NumOutOfRange { .. })));
            assert!(!compose.exists());
        }
    }

    #[test]
    fn test_missing_override_writes_nothing() {
        let (temp, settings) = setup();
        let compose = temp.path().join("docker-compose.yml");

        let result = expand_to_file(&settings, &temp.path().join("missing.yml"), 2, &compose);
        assert!(matches!(result, Err(DupError::ConfigNotFound(_))));
        assert!(!compose.exists());
    }

    #[test]
    fn test_failed_expansion_keeps_previous_compose() {
        let (temp, settings) = setup();
        let compose = temp.path().join("docker-compose.yml");
        expand_to_file(&settings, &temp.path().join("run.yml"), 3, &compose).unwrap();
        let before = std::fs::read_to_string(&compose).unwrap();

        assert!(expand_to_file(&settings, &temp.path().join("run.yml"), 0, &compose).is_err());
        assert_eq!(std::fs::read_to_string(&compose).unwrap(), before);
        assert_eq!(read_log(&compose).unwrap().num, 3);
    }
}
