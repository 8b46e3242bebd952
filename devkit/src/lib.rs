/*!
# Inventory DevKit - Stubs and helpers for agent development

Lets the collection pipeline run without Oracle, Exadata or hypervisors:
- `StubFetcher`: scripted probe results, failure and panic injection, call recording
- `fixtures`: realistic probe data
- `TestHarness`: configuration + stub + platform, with assertions on the report JSON
*/

pub mod fetcher_stub;
pub mod fixtures;
pub mod test_utils;

pub use fetcher_stub::{ProbeCall, StubDatabase, StubFetcher};
pub use test_utils::TestHarness;
