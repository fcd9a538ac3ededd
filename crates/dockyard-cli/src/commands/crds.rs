//! Crds command - print the CustomResourceDefinitions

use dockyard_core::crd::all_crds;
use std::io::Write;

use crate::error::Result;

/// Run the crds command
pub fn run() -> Result<()> {
    let manifests = render()?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(manifests.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Render every definition as one YAML stream
pub fn render() -> Result<String> {
    let mut out = String::new();
    for crd in all_crds() {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(&crd)?);
    }
    Ok(out)
}
