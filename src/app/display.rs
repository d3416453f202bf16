//! Module status table

use crate::core::styles::StyleRole;
use crate::plugin::api::{LoadReport, ModuleRegistry, UnloadedReason};
use prettytable::{format, Cell, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Loaded,
    Disabled,
    Unsatisfied,
}

impl ModuleStatus {
    fn label(self) -> &'static str {
        match self {
            ModuleStatus::Loaded => "loaded",
            ModuleStatus::Disabled => "disabled",
            ModuleStatus::Unsatisfied => "unsatisfied",
        }
    }

    fn role(self) -> StyleRole {
        match self {
            ModuleStatus::Loaded => StyleRole::Valid,
            ModuleStatus::Disabled => StyleRole::Dim,
            ModuleStatus::Unsatisfied => StyleRole::Invalid,
        }
    }
}

/// One line of the status table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRow {
    pub name: String,
    pub version: String,
    pub source: String,
    pub status: ModuleStatus,
    pub detail: String,
}

/// Rows for every installed module, in registration order
pub fn module_rows(modules: &ModuleRegistry, report: &LoadReport) -> Vec<ModuleRow> {
    modules
        .manifests()
        .iter()
        .map(|manifest| {
            let (status, detail) = match report.unloaded(manifest.name()).map(|u| &u.reason) {
                Some(UnloadedReason::Disabled) => (ModuleStatus::Disabled, String::new()),
                Some(UnloadedReason::UnsatisfiedDependencies(deps)) => (
                    ModuleStatus::Unsatisfied,
                    deps.iter()
                        .map(|d| d.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                None if manifest.is_loaded() => (ModuleStatus::Loaded, String::new()),
                None => (ModuleStatus::Unsatisfied, String::new()),
            };
            ModuleRow {
                name: manifest.name().to_string(),
                version: manifest.version().to_string(),
                source: manifest
                    .source_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                status,
                detail,
            }
        })
        .collect()
}

pub fn render_table(rows: &[ModuleRow], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    let header = |text: &str| {
        let cell = Cell::new(text);
        match StyleRole::Header.to_prettytable_spec() {
            Some(spec) if use_color => cell.style_spec(&format!("b{}", spec)),
            _ => cell,
        }
    };
    table.set_titles(Row::new(vec![
        header("Module"),
        header("Version"),
        header("Source"),
        header("Status"),
        header("Missing"),
    ]));

    for row in rows {
        let mut status = Cell::new(row.status.label());
        if let Some(spec) = row.status.role().to_prettytable_spec().filter(|_| use_color) {
            status = status.style_spec(spec);
        }
        table.add_row(Row::new(vec![
            Cell::new(&row.name),
            Cell::new(&row.version),
            Cell::new(&row.source),
            status,
            Cell::new(&row.detail),
        ]));
    }
    table
}

/// Print the table, or a single line when nothing is installed
pub fn print_module_table(modules: &ModuleRegistry, report: &LoadReport, use_color: bool) {
    let rows = module_rows(modules, report);
    if rows.is_empty() {
        println!("{}", StyleRole::Dim.paint("No modules installed", use_color));
        return;
    }
    render_table(&rows, use_color).printstd();
    println!(
        "{}",
        StyleRole::Header.paint(
            &format!("{} of {} module(s) loaded", report.loaded.len(), rows.len()),
            use_color
        )
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::{host_module_name, host_version};
    use crate::plugin::api::{Dependency, Manifest, SourceType, UnloadedModule};

    fn registry() -> ModuleRegistry {
        let host = Manifest::builder(host_module_name(), host_version())
            .system(true)
            .build()
            .unwrap();
        let registry = ModuleRegistry::new(host, Vec::new());
        registry
            .register(
                Manifest::builder("alpha", "1.0")
                    .source_type(SourceType::System)
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .set_loaded(true);
        registry
            .register(Manifest::builder("beta", "0.3").build().unwrap())
            .unwrap();
        registry
            .register(Manifest::builder("gamma", "2").enabled(false).build().unwrap())
            .unwrap();
        registry
    }

    fn report() -> LoadReport {
        LoadReport {
            loaded: vec!["alpha".to_string()],
            unloaded: vec![
                UnloadedModule {
                    name: "beta".to_string(),
                    reason: UnloadedReason::UnsatisfiedDependencies(vec![Dependency::new(
                        "delta",
                        Some("+1.0"),
                    )
                    .unwrap()]),
                },
                UnloadedModule {
                    name: "gamma".to_string(),
                    reason: UnloadedReason::Disabled,
                },
            ],
        }
    }

    #[test]
    fn test_rows_follow_report() {
        let rows = module_rows(&registry(), &report());
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].status, ModuleStatus::Loaded);
        assert_eq!(rows[0].source, "system");

        assert_eq!(rows[1].status, ModuleStatus::Unsatisfied);
        assert!(rows[1].detail.contains("delta"));
        assert_eq!(rows[1].source, "-");

        assert_eq!(rows[2].status, ModuleStatus::Disabled);
        assert!(rows[2].detail.is_empty());
    }

    #[test]
    fn test_plain_table_has_no_escapes() {
        let rows = module_rows(&registry(), &report());
        let rendered = render_table(&rows, false).to_string();
        assert!(rendered.contains("Module"));
        assert!(rendered.contains("unsatisfied"));
        assert!(!rendered.contains('\x1b'));
    }
}
