use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use directories::UserDirs;
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::{error, info};

use crate::config::{
    default_config_dir, default_db_path, AppConfig, ColumnDef, ColumnKind, GridConfig,
    PersistenceMode,
};
use crate::domain::entities::criteria::SortDirection;
use crate::domain::entities::row::{GridRow, RowDraft};
use crate::domain::entities::sort_model::SortModelEntry;
use crate::infra::http::rpc_client::RpcClient;
use crate::infra::sqlite::repo::SqliteScratchStore;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::{status_line, AppState};
use crate::ui::state::filter_inputs::{cycle_sort, DateOp, FilterInput, FilterInputs};
use crate::ui::state::pager::Pager;
use crate::usecase::ports::persistence::{LocalOnly, RowPersistence};
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::export_service::{default_export_path, ExportService};
use crate::usecase::services::grid_coordinator::{CoordinatorConfig, GridCoordinator};
use crate::usecase::services::query_service::QueryService;

const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

const CELL_STYLE: &str = "border: 1px solid #bbb; padding: 4px 6px; white-space: nowrap;";
const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";

/// Services behind the grid view, built once per window.
#[derive(Clone)]
struct Services {
    coordinator: Arc<GridCoordinator>,
    pager: Pager,
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.coordinator, &other.coordinator)
    }
}

fn build_persistence(config: &AppConfig) -> Result<Arc<dyn RowPersistence>> {
    let repo: Arc<dyn RowPersistence> = match config.persistence {
        PersistenceMode::None => Arc::new(LocalOnly),
        PersistenceMode::Sqlite => Arc::new(SqliteScratchStore::new(default_db_path()?)),
    };
    repo.init().context("failed to initialise local edit store")?;
    Ok(repo)
}

fn bootstrap() -> Result<Services> {
    let config = AppConfig::load(&default_config_dir()?)?;
    info!(
        api_base_url = %config.api_base_url,
        page_size = config.page_size,
        persistence = ?config.persistence,
        "starting issue grid"
    );

    let grid = Arc::new(GridConfig::default());
    let transport = Arc::new(RpcClient::from_config(&config)?);
    info!(endpoint = %transport.endpoint(), "issue search endpoint resolved");
    let query = Arc::new(QueryService::new(transport, grid.clone()));
    let edits = EditService::new(build_persistence(&config)?, grid.editable_columns.clone());
    let pager = Pager::new(config.page_size);

    let coordinator = GridCoordinator::new(
        query,
        edits,
        ExportService::new(grid),
        Arc::new(pager.clone()),
        CoordinatorConfig {
            page_size: config.page_size,
            debounce: config.debounce(),
        },
    );

    Ok(Services {
        coordinator: Arc::new(coordinator),
        pager,
    })
}

/// Column filters replace the whole model, so the search box's filter rides along.
fn apply_filters(coordinator: &GridCoordinator, inputs: &FilterInputs) {
    let search_column = coordinator.grid().search_column.clone();
    let current = coordinator.snapshot();
    let carried = current.state.filter_model.get(&search_column);
    let model = inputs.to_filter_model(carried.map(|filter| (search_column.as_str(), filter)));
    coordinator.set_filter_model(model);
}

fn sort_indicator(sort_model: &[SortModelEntry], field: &str) -> String {
    let Some(position) = sort_model.iter().position(|entry| entry.col_id == field) else {
        return String::new();
    };
    let arrow = match sort_model[position].sort {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
    };
    if sort_model.len() > 1 {
        format!(" {arrow}{}", position + 1)
    } else {
        format!(" {arrow}")
    }
}

fn export_target() -> Option<PathBuf> {
    let dir = UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(|dir| dir.to_path_buf()))
        .unwrap_or_default();
    let suggested = default_export_path(&dir, Local::now().date_naive());
    let file_name = suggested
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    FileDialog::new()
        .add_filter("CSV", &["csv"])
        .set_directory(&dir)
        .set_file_name(file_name)
        .save_file()
}

#[component]
pub fn App() -> Element {
    let services = use_hook(|| bootstrap().map_err(|err| format!("{err:#}")));

    match services {
        Ok(services) => rsx! {
            IssueGrid { services }
        },
        Err(err) => {
            error!(error = %err, "failed to start issue grid");
            rsx! {
                div {
                    p { "Unable to start: {err}" }
                }
            }
        }
    }
}

#[component]
fn FilterCell(
    column: ColumnDef,
    services: Services,
    mut filter_inputs: Signal<FilterInputs>,
) -> Element {
    let field = column.field;
    let current = filter_inputs.read().get(field).cloned();

    match column.kind {
        ColumnKind::Text => {
            let text = match current {
                Some(FilterInput::Text(text)) => text,
                _ => String::new(),
            };
            rsx! {
                input {
                    style: "width: 100%; box-sizing: border-box;",
                    placeholder: "Contains",
                    value: text,
                    oninput: move |event| {
                        filter_inputs.write().set(field, FilterInput::Text(event.value()));
                    },
                    onchange: move |_| {
                        apply_filters(&services.coordinator, &filter_inputs.read());
                    },
                }
            }
        }
        ColumnKind::Set(values) => {
            let selected = match current {
                Some(FilterInput::Set(selected)) => selected,
                _ => Default::default(),
            };
            rsx! {
                div {
                    style: "display: flex; flex-direction: column; gap: 2px; font-weight: normal;",
                    for value in values.iter().copied() {
                        label {
                            key: "{value}",
                            input {
                                r#type: "checkbox",
                                checked: selected.contains(value),
                                onchange: {
                                    let services = services.clone();
                                    move |_| {
                                        filter_inputs.write().toggle_set_value(field, value);
                                        apply_filters(&services.coordinator, &filter_inputs.read());
                                    }
                                },
                            }
                            " {value}"
                        }
                    }
                }
            }
        }
        ColumnKind::Date => {
            let (op, value) = match current {
                Some(FilterInput::Date { op, value }) => (op, value),
                _ => (DateOp::Any, String::new()),
            };
            let services_for_op = services.clone();
            let services_for_value = services.clone();
            let needs_value = matches!(op, DateOp::Equals | DateOp::GreaterThan | DateOp::LessThan);
            rsx! {
                div {
                    style: "display: flex; flex-direction: column; gap: 2px;",
                    select {
                        value: op.value(),
                        onchange: move |event| {
                            let op = DateOp::from_value(&event.value());
                            let value = match filter_inputs.read().get(field) {
                                Some(FilterInput::Date { value, .. }) => value.clone(),
                                _ => String::new(),
                            };
                            filter_inputs.write().set(field, FilterInput::Date { op, value });
                            apply_filters(&services_for_op.coordinator, &filter_inputs.read());
                        },
                        for option in DateOp::ALL {
                            option {
                                value: option.value(),
                                selected: option == op,
                                {option.label()}
                            }
                        }
                    }
                    if needs_value {
                        input {
                            r#type: "date",
                            value: value,
                            onchange: move |event| {
                                filter_inputs
                                    .write()
                                    .set(field, FilterInput::Date { op, value: event.value() });
                                apply_filters(&services_for_value.coordinator, &filter_inputs.read());
                            },
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn IssueGrid(services: Services) -> Element {
    let coordinator = services.coordinator.clone();
    let pager = services.pager.clone();
    let page_size = coordinator.snapshot().state.page_size;

    let AppState {
        mut snapshot,
        mut search_text,
        mut filter_inputs,
        mut header_sort,
        mut draft,
        mut status,
    } = AppState::new(page_size);

    let coordinator_for_watch = coordinator.clone();
    use_future(move || {
        let coordinator = coordinator_for_watch.clone();
        async move {
            let mut updates = coordinator.subscribe();
            loop {
                let current = updates.borrow_and_update().clone();
                let pending = coordinator
                    .pending_changes()
                    .map(|changes| changes.len())
                    .unwrap_or_default();
                status.set(status_line(&current, pending));
                snapshot.set(current);
                if updates.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    let coordinator_for_init = coordinator.clone();
    use_hook(move || {
        coordinator_for_init.refresh();
    });

    let coordinator_for_drop = coordinator.clone();
    use_drop(move || coordinator_for_drop.shutdown());

    let grid = coordinator.grid().clone();
    let editable_columns = coordinator.editable_columns().to_vec();
    let current = snapshot();
    let page = current.state.current_page;
    let page_count = current.page_count();
    let current_size = current.state.page_size;
    let sort_model = header_sort();
    let headers: Vec<(&'static str, String)> = grid
        .columns
        .iter()
        .map(|column| {
            let label = format!("{}{}", column.header, sort_indicator(&sort_model, column.field));
            (column.field, label)
        })
        .collect();
    let display_rows: Vec<(u64, GridRow, Vec<String>)> = current
        .rows
        .iter()
        .map(|grid_row| {
            let cells = grid
                .columns
                .iter()
                .map(|column| grid_row.row.display(column.field))
                .collect();
            (grid_row.key.0, grid_row.clone(), cells)
        })
        .collect();
    let editing = draft();
    let draft_inputs: Vec<(String, String, String)> = editing
        .as_ref()
        .map(|editing| {
            editing
                .fields
                .iter()
                .map(|(field, value)| {
                    (field.clone(), grid.header_for(field).to_string(), value.clone())
                })
                .collect()
        })
        .unwrap_or_default();

    let coordinator_for_search = coordinator.clone();
    let coordinator_for_reload = coordinator.clone();
    let coordinator_for_clear = coordinator.clone();
    let coordinator_for_export = coordinator.clone();
    let coordinator_for_save = coordinator.clone();
    let pager_for_prev = pager.clone();
    let coordinator_for_prev = coordinator.clone();
    let pager_for_next = pager.clone();
    let coordinator_for_next = coordinator.clone();
    let pager_for_size = pager.clone();
    let coordinator_for_size = coordinator.clone();
    let editable_for_add = editable_columns.clone();

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px; display: flex; flex-direction: column; gap: 8px;",
            div {
                style: "display: flex; gap: 8px; align-items: center;",
                input {
                    style: "flex: 1; padding: 4px 8px;",
                    placeholder: "Search titles",
                    value: search_text(),
                    oninput: move |event| {
                        let text = event.value();
                        search_text.set(text.clone());
                        coordinator_for_search.on_search_box_changed(text);
                    },
                }
                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        draft.set(Some(RowDraft {
                            id: None,
                            fields: editable_for_add.iter().map(|field| (field.clone(), String::new())).collect(),
                        }));
                    },
                    "Add issue"
                }
                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        let Some(path) = export_target() else {
                            return;
                        };
                        let coordinator = coordinator_for_export.clone();
                        status.set(format!("Exporting to {}", path.display()));
                        spawn(async move {
                            let target = path.clone();
                            match run_blocking(move || coordinator.export_csv(&target)).await {
                                Ok(written) => status.set(format!("Exported {written} row(s) to {}", path.display())),
                                Err(err) => {
                                    error!(error = %format!("{err:#}"), "export failed");
                                    status.set(format!("Export failed: {err:#}"));
                                }
                            }
                        });
                    },
                    "Export CSV"
                }
                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        coordinator_for_reload.refresh();
                    },
                    "Reload"
                }
                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        filter_inputs.write().clear();
                        apply_filters(&coordinator_for_clear, &filter_inputs.read());
                    },
                    "Clear filters"
                }
            }

            p { style: "margin: 0; color: #555;", "{status}" }

            div {
                style: "overflow: auto; max-height: 70vh; border: 1px solid #ddd;",
                table {
                    style: "border-collapse: collapse; width: 100%; font-size: 13px;",
                    thead {
                        tr {
                            for (field, label) in headers {
                                th {
                                    key: "{field}",
                                    style: "{CELL_STYLE} background: #f3f3f3; cursor: pointer; text-align: left;",
                                    title: "Click to sort, shift-click to add a sort",
                                    onclick: {
                                        let coordinator = coordinator.clone();
                                        move |event: MouseEvent| {
                                            let additive = event.modifiers().contains(Modifiers::SHIFT);
                                            let next = cycle_sort(&header_sort.read(), field, additive);
                                            header_sort.set(next.clone());
                                            coordinator.on_sort_ui_changed(next);
                                        }
                                    },
                                    "{label}"
                                }
                            }
                            th { style: "{CELL_STYLE} background: #f3f3f3;", "" }
                        }
                        tr {
                            for (field, column) in grid.columns.iter().map(|column| (column.field, column.clone())) {
                                th {
                                    key: "filter-{field}",
                                    style: "{CELL_STYLE} vertical-align: top;",
                                    FilterCell { column, services: services.clone(), filter_inputs }
                                }
                            }
                            th { style: CELL_STYLE, "" }
                        }
                    }
                    tbody {
                        for (row_id, grid_row, cells) in display_rows {
                            tr {
                                key: "{row_id}",
                                for cell in cells {
                                    td { style: CELL_STYLE, "{cell}" }
                                }
                                td {
                                    style: "{CELL_STYLE} display: flex; gap: 4px;",
                                    button {
                                        style: BUTTON_STYLE,
                                        onclick: {
                                            let row = grid_row.row.clone();
                                            let editable = editable_columns.clone();
                                            move |_| draft.set(Some(RowDraft::from_row(&row, &editable)))
                                        },
                                        "Edit"
                                    }
                                    button {
                                        style: BUTTON_STYLE,
                                        onclick: {
                                            let coordinator = coordinator.clone();
                                            let key = grid_row.key;
                                            move |_| {
                                                let confirm = MessageDialog::new()
                                                    .set_level(MessageLevel::Warning)
                                                    .set_title("Delete issue")
                                                    .set_description("Remove this issue from the grid?")
                                                    .set_buttons(MessageButtons::YesNo)
                                                    .show();
                                                if confirm != MessageDialogResult::Yes {
                                                    return;
                                                }
                                                if !coordinator.remove(key) {
                                                    status.set("Issue is no longer on this page".to_string());
                                                }
                                            }
                                        },
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center;",
                button {
                    style: BUTTON_STYLE,
                    disabled: page <= 1,
                    onclick: move |_| {
                        pager_for_prev.go_to(page.saturating_sub(1), page_count);
                        coordinator_for_prev.on_page_or_size_ui_changed();
                    },
                    "Previous"
                }
                span { "Page {page} of {page_count}" }
                button {
                    style: BUTTON_STYLE,
                    disabled: u64::from(page) >= page_count,
                    onclick: move |_| {
                        pager_for_next.go_to(page.saturating_add(1), page_count);
                        coordinator_for_next.on_page_or_size_ui_changed();
                    },
                    "Next"
                }
                span { "Rows per page" }
                select {
                    value: "{current_size}",
                    onchange: move |event| {
                        let Ok(size) = event.value().parse::<u32>() else {
                            return;
                        };
                        pager_for_size.set_page_size(size);
                        coordinator_for_size.on_page_or_size_ui_changed();
                    },
                    for size in PAGE_SIZE_OPTIONS {
                        option {
                            key: "{size}",
                            value: "{size}",
                            selected: size == current_size,
                            "{size}"
                        }
                    }
                }
            }

            if let Some(editing) = editing {
                div {
                    style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1000;",
                    div {
                        style: "background: #fff; padding: 16px; border-radius: 8px; min-width: 360px; display: flex; flex-direction: column; gap: 8px;",
                        h3 {
                            style: "margin: 0;",
                            if editing.id.is_some() { "Edit issue" } else { "Add issue" }
                        }
                        for (field, header, value) in draft_inputs {
                            label {
                                key: "{header}",
                                style: "display: flex; flex-direction: column; gap: 2px;",
                                "{header}"
                                input {
                                    value: value,
                                    oninput: move |event| {
                                        if let Some(editing) = draft.write().as_mut() {
                                            editing.fields.insert(field.clone(), event.value());
                                        }
                                    },
                                }
                            }
                        }
                        div {
                            style: "display: flex; gap: 8px; justify-content: flex-end;",
                            button {
                                style: BUTTON_STYLE,
                                onclick: move |_| draft.set(None),
                                "Cancel"
                            }
                            button {
                                style: BUTTON_STYLE,
                                onclick: move |_| {
                                    let Some(editing) = draft() else {
                                        return;
                                    };
                                    if coordinator_for_save.add_or_update(editing).is_none() {
                                        status.set("Issue is no longer on this page".to_string());
                                    }
                                    draft.set(None);
                                },
                                "Save"
                            }
                        }
                    }
                }
            }
        }
    }
}
