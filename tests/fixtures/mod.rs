//! Shared test fixtures for library and CLI tests.
#![allow(dead_code)] // Not every fixture is used by every test binary

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Wraps physical-key records into a complete layout document.
pub fn layout_source(klid: &str, display_name: &str, keys: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<KbdLayout RightAltIsAltGr="true">
  <metadata KLID="{klid}" LocaleName="xx-XX" LayoutDisplayName="{display_name}"/>
  <PhysicalKeys>
{keys}
  </PhysicalKeys>
</KbdLayout>"#
    )
}

/// A small but representative layout: letters with Shift variants, a main
/// row and numpad slash, a dead key with a nested level, an action key and
/// a numpad digit.
pub fn layout_basic() -> String {
    layout_source(
        "00000807",
        "Swiss German",
        r#"    <PK SC="1E" VK="VK_A">
      <Result Text="a"/>
      <Result Text="A" With="VK_SHIFT"/>
    </PK>
    <PK SC="35" VK="VK_OEM_2">
      <Result Text="/"/>
    </PK>
    <PK SC="E035" VK="VK_DIVIDE">
      <Result Text="/"/>
    </PK>
    <PK SC="4F" VK="VK_NUMPAD1">
      <Result Text="1" With="VK_NUMLOCK"/>
    </PK>
    <PK SC="02" VK="VK_1">
      <Result Text="1"/>
    </PK>
    <PK SC="1A" VK="VK_OEM_4">
      <Result>
        <DeadKeyTable Accent="^">
          <Result Text="â" With="a"/>
          <Result With="~">
            <DeadKeyTable Accent="~">
              <Result Text="â" With="q"/>
              <Result Text="ṽ" With="v"/>
            </DeadKeyTable>
          </Result>
        </DeadKeyTable>
      </Result>
    </PK>
    <PK SC="3B" VK="VK_F1"/>"#,
    )
}

/// A layout whose only F1 record is modifier-qualified: exactly one
/// validation error.
pub fn layout_action_with_modifier() -> String {
    layout_source(
        "0000040c",
        "French",
        r#"    <PK SC="3B" VK="VK_X">
      <Result VK="VK_F1" With="VK_SHIFT"/>
    </PK>"#,
    )
}

/// Writes a layout document to a temp file, returning the path and its
/// guard.
pub fn create_temp_layout_file(content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("layout.xml");
    fs::write(&path, content).expect("Failed to write layout file");
    (path, temp_dir)
}
