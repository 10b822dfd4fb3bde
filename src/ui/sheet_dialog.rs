use std::path::PathBuf;

/// State for the sheet picker, opened when a workbook has several sheets.
pub struct SheetSelectionState {
    pub path: PathBuf,
    pub sheets: Vec<String>,
    pub selected: usize,
}

impl SheetSelectionState {
    pub fn new(path: PathBuf, sheets: Vec<String>) -> Self {
        Self {
            path,
            sheets,
            selected: 0,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of the sheet dialog interaction each frame.
pub enum SheetDialogResult {
    Ok { path: PathBuf, sheet: String },
    Cancel,
}

/// Show the sheet picker as an egui window.
///
/// Returns `Some` when the user presses Load or Cancel, `None` while the
/// dialog is still open.
pub fn show_sheet_dialog(
    ctx: &egui::Context,
    state: &mut SheetSelectionState,
) -> Option<SheetDialogResult> {
    let mut result = None;

    egui::Window::new("Select a Sheet")
        .collapsible(false)
        .resizable(false)
        .default_width(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "{} contains {} sheets.",
                    state.file_name(),
                    state.sheets.len()
                ))
                .weak(),
            );
            ui.add_space(12.0);

            ui.label(egui::RichText::new("Sheet").strong());
            ui.add_space(2.0);
            let current = state.sheets.get(state.selected).cloned().unwrap_or_default();
            egui::ComboBox::from_id_salt("sheet_selector")
                .selected_text(current)
                .width(300.0)
                .show_ui(ui, |ui| {
                    for (i, name) in state.sheets.iter().enumerate() {
                        ui.selectable_value(&mut state.selected, i, name);
                    }
                });

            ui.add_space(16.0);
            ui.horizontal(|ui| {
                let load_btn = ui.add_enabled(
                    state.selected < state.sheets.len(),
                    egui::Button::new(egui::RichText::new("Load").strong())
                        .min_size(egui::vec2(100.0, 32.0)),
                );
                if load_btn.clicked() {
                    if let Some(sheet) = state.sheets.get(state.selected) {
                        result = Some(SheetDialogResult::Ok {
                            path: state.path.clone(),
                            sheet: sheet.clone(),
                        });
                    }
                }
                if ui.add(egui::Button::new("Cancel").min_size(egui::vec2(100.0, 32.0))).clicked() {
                    result = Some(SheetDialogResult::Cancel);
                }
            });
        });

    result
}
