//! `script`: write a wget script equivalent to `fetch`.

use anyhow::Result;
use datamirror_core::manifest::{Manifest, extract_urls};
use datamirror_core::plan::plan_items;
use datamirror_core::script::{render_script, write_script};

use crate::ProcessExit;
use crate::app::config::FileConfig;
use crate::app::settings;
use crate::cli::ScriptArgs;

pub(crate) fn run_script(args: &ScriptArgs, file_config: Option<&FileConfig>) -> Result<ProcessExit> {
    let layout = settings::layout_config(&args.layout, file_config)?;

    let manifest = Manifest::load(&args.layout.manifest)?;
    let items = plan_items(&extract_urls(&manifest), &layout)?;

    let text = render_script(&items, layout.data_root())?;
    let out = settings::absolute(&args.out)?;
    write_script(&out, &text)?;

    println!("Wrote wget script with {} items: {}", items.len(), out.display());
    Ok(ProcessExit::Success)
}
