use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("Created .wcscanrc.json"));

    let content = test.read_file(".wcscanrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["ignoreTestFiles"], Value::Bool(true));
    assert_eq!(parsed["conventions"]["eventCallbackPrefix"], "on");
    assert!(parsed["conventions"]["wrapperFactories"].is_array());
    assert!(content.contains("\n  "), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".wcscanrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".wcscanrc.json already exists"));
    assert_eq!(test.read_file(".wcscanrc.json")?, "{}");

    Ok(())
}
