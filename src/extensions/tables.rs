use super::{Extension, Registries};
use crate::block_parser::BlockParser;
use crate::blockprocessors::BlockProcessor;
use crate::config::Options;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use std::collections::VecDeque;

/// Pipe tables with a `---|:---:` separator row.
pub struct TableProcessor;

impl TableProcessor {
    fn split_row(row: &str, border: bool) -> Vec<&str> {
        let mut row = row;
        if border {
            row = row.strip_prefix('|').unwrap_or(row);
            row = row.strip_suffix('|').unwrap_or(row);
        }
        row.split('|').collect()
    }

    fn build_row(row: &str, parent: &mut Element, align: &[Option<&'static str>], border: bool) {
        let tag = if parent.tag == "thead" { "th" } else { "td" };
        let cells = Self::split_row(row, border);
        let tr = parent.sub_element("tr");
        for (i, alignment) in align.iter().enumerate() {
            let cell = tr.sub_element(tag);
            cell.text = cells.get(i).map_or("", |c| c.trim()).to_string();
            if let Some(alignment) = alignment {
                cell.set("align", *alignment);
            }
        }
    }
}

fn alignment(cell: &str) -> Option<&'static str> {
    let cell = cell.trim();
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Some("center"),
        (true, false) => Some("left"),
        (false, true) => Some("right"),
        (false, false) => None,
    }
}

impl BlockProcessor for TableProcessor {
    fn name(&self) -> &'static str {
        "table"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        let rows: Vec<&str> = block.split('\n').collect();
        rows.len() > 2
            && rows[0].contains('|')
            && rows[1].contains('|')
            && rows[1].contains('-')
            && rows[1].trim().starts_with(['|', ':', '-'])
    }

    fn run(
        &self,
        _parser: &BlockParser,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        _ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        let Some(block) = blocks.pop_front() else {
            return Ok(());
        };
        let lines: Vec<&str> = block.split('\n').collect();
        let header = lines[0].trim();
        let separator = lines.get(1).map_or("", |l| l.trim());
        let border = header.starts_with('|');
        let align: Vec<Option<&'static str>> = Self::split_row(separator, border).into_iter().map(alignment).collect();

        let table = parent.sub_element("table");
        Self::build_row(header, table.sub_element("thead"), &align, border);
        let tbody = table.sub_element("tbody");
        for row in lines.iter().skip(2) {
            Self::build_row(row.trim(), tbody, &align, border);
        }
        Ok(())
    }
}

pub struct TableExtension;

impl Extension for TableExtension {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn extend(&self, registries: &mut Registries, _options: &Options) -> MarkdownResult<()> {
        registries
            .block_parser
            .processors
            .add("table", Box::new(TableProcessor), "<hash_header")?;
        log::debug!("[rumdown-ext] Registered table processor");
        Ok(())
    }
}
