use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout_json};

const CARD: &str = r#"
import { LitElement } from 'lit';
import { customElement, property } from 'lit/decorators.js';

export interface CardSelectDetail {
  id: string;
  index: number;
}

@customElement('x-card')
export class Card extends LitElement {
  /** Title shown in the header. */
  @property() heading: string = 'Untitled';

  /**
   * @deprecated use `heading`
   */
  @property({ attribute: 'sub-title' }) subTitle?: string;

  @property({ type: Array }) tags: string[] = [];

  select(index: number) {
    this.dispatchEvent(
      new CustomEvent<CardSelectDetail>('card-select', { detail: { id: this.id, index }, bubbles: true, composed: true })
    );
  }
}
"#;

const RATING: &str = r#"
type Size = 'sm' | 'md' | 'lg';

interface RatingProps {
  value: number;
  size?: Size;
  onRate?: (detail: { stars: number }) => void;
}

export const Rating = ({ value, size = 'md', onRate }: RatingProps) => {
  return <div data-size={size}>{value}</div>;
};
"#;

const REGISTER: &str = r#"
import r2wc from '@r2wc/react-to-web-component';
import { Rating } from './rating';

const RatingElement = r2wc(Rating, { props: { value: 'number' } });
customElements.define('x-rating', RatingElement);
"#;

const WEBPACK: &str = r#"
const { ModuleFederationPlugin } = require('webpack').container;
module.exports = {
  plugins: [
    new ModuleFederationPlugin({
      name: 'design_system',
      library: { type: 'module' },
      exposes: { './Card': './src/card.ts' },
    }),
  ],
};
"#;

fn project() -> Result<CliTest> {
    CliTest::with_files(&[
        ("src/card.ts", CARD),
        ("src/rating.tsx", RATING),
        ("src/register.ts", REGISTER),
        ("webpack.config.js", WEBPACK),
    ])
}

#[test]
fn test_extract_project() -> Result<()> {
    let test = project()?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let model = stdout_json(&output)?;

    assert_eq!(
        model["runtime"],
        json!({
            "bundler": "webpack",
            "federation": {
                "remoteName": "design_system",
                "libraryType": "module",
                "exposes": {"./Card": "./src/card.ts"}
            }
        })
    );

    let components = model["components"].as_array().unwrap();
    assert_eq!(components.len(), 2);

    let card = &components[0];
    assert_eq!(card["tagName"], "x-card");
    assert_eq!(card["implementationRef"], "Card");
    assert_eq!(card["modulePath"], "src/card.ts");
    assert_eq!(
        card["properties"],
        json!([
            {
                "name": "heading",
                "externalName": "heading",
                "schema": {"type": "string"},
                "required": true,
                "sourceKind": "decorator",
                "description": "Title shown in the header.",
                "default": "Untitled"
            },
            {
                "name": "subTitle",
                "externalName": "sub-title",
                "schema": {"type": "string"},
                "required": false,
                "sourceKind": "decorator",
                "deprecated": true
            },
            {
                "name": "tags",
                "externalName": "tags",
                "schema": {"type": "array", "items": {"type": "string"}},
                "required": true,
                "sourceKind": "decorator"
            }
        ])
    );
    assert_eq!(
        card["events"],
        json!([
            {
                "name": "card-select",
                "type": "CustomEvent",
                "payloadSchema": {
                    "type": "object",
                    "properties": {"id": {}, "index": {}}
                },
                "sourceKind": "dispatch",
                "bubbles": true,
                "composed": true
            }
        ])
    );

    let rating = &components[1];
    assert_eq!(rating["tagName"], "x-rating");
    assert_eq!(rating["implementationRef"], "Rating");
    assert_eq!(rating["modulePath"], "src/rating.tsx");
    assert_eq!(
        rating["properties"],
        json!([
            {
                "name": "value",
                "externalName": "value",
                "schema": {"type": "number"},
                "required": true,
                "sourceKind": "shape"
            },
            {
                "name": "size",
                "externalName": "size",
                "schema": {"type": "string", "enum": ["sm", "md", "lg"]},
                "required": false,
                "sourceKind": "shape",
                "default": "md"
            }
        ])
    );
    assert_eq!(
        rating["events"],
        json!([
            {
                "name": "rate",
                "type": "CustomEvent",
                "payloadSchema": {
                    "type": "object",
                    "properties": {"stars": {"type": "number"}},
                    "required": ["stars"]
                },
                "sourceKind": "callback"
            }
        ])
    );

    let stderr = stderr(&output);
    assert!(stderr.contains("Extracted 2 components (5 properties, 2 events)"));
    assert!(stderr.contains("federation remote design_system"));

    Ok(())
}

#[test]
fn test_output_file_and_compact() -> Result<()> {
    let test = project()?;

    let output = test
        .extract_command()
        .args(["--output", "model.json", "--compact"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());

    let written = test.read_file("model.json")?;
    assert_eq!(written.lines().count(), 1);
    let model: serde_json::Value = serde_json::from_str(&written)?;
    assert_eq!(model["components"].as_array().unwrap().len(), 2);

    Ok(())
}

#[test]
fn test_root_flag_and_missing_build_config() -> Result<()> {
    let test = CliTest::with_files(&[(
        "app/src/el.ts",
        "class El extends HTMLElement {}\ncustomElements.define('x-el', El);\n",
    )])?;

    let output = test.extract_command().args(["--root", "app"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    let model = stdout_json(&output)?;
    assert_eq!(model["runtime"], json!({"bundler": "unknown"}));
    assert_eq!(model["components"][0]["modulePath"], "src/el.ts");

    Ok(())
}

#[test]
fn test_strict_fails_on_warnings() -> Result<()> {
    let test = CliTest::with_files(&[(
        "src/main.ts",
        r#"
const name = 'x-dynamic';
class Dynamic extends HTMLElement {}
customElements.define(name, Dynamic);
customElements.define('x-missing', Missing);
"#,
    )])?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    let stderr_text = stderr(&output);
    assert!(stderr_text.contains("malformed-registration"));
    assert!(stderr_text.contains("--> src/main.ts:4"));
    assert!(stderr_text.contains("unresolved-symbol"));
    assert_eq!(stdout_json(&output)?["components"], json!([]));

    let output = test.extract_command().arg("--strict").output()?;
    assert_eq!(output.status.code(), Some(1));

    Ok(())
}

#[test]
fn test_config_file_and_test_files_are_respected() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            ".wcscanrc.json",
            r#"{ "ignores": ["legacy"], "conventions": { "registrationFunctions": ["register"] } }"#,
        ),
        (
            "src/widget.ts",
            "class Widget extends HTMLElement {}\nregister('x-widget', Widget);\n",
        ),
        (
            "legacy/old.ts",
            "class Old extends HTMLElement {}\ncustomElements.define('x-old', Old);\n",
        ),
        (
            "src/widget.test.ts",
            "class Fake extends HTMLElement {}\ncustomElements.define('x-fake', Fake);\n",
        ),
    ])?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let model = stdout_json(&output)?;
    let tags: Vec<&str> = model["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["tagName"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["x-widget"]);

    Ok(())
}

#[test]
fn test_missing_root_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test
        .extract_command()
        .args(["--root", "does-not-exist"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("does not exist"));
    assert!(output.stdout.is_empty());

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_files(&[(".wcscanrc.json", r#"{ "ignores": ["[oops"] }"#)])?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid glob pattern"));

    Ok(())
}
