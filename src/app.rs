use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use eframe::egui;

use crate::chart::color::ACCENT_PRESETS;
use crate::chart::figure::Figure;
use crate::data::loader::{self, LoadOutcome};
use crate::error::{AnalyzerError, Result};
use crate::render::raster::render_png;
use crate::report::pdf::export_report;
use crate::state::app_state::{Session, VERSION};
use crate::state::settings::{Settings, SETTINGS_EXTENSION};
use crate::ui::chart_builder_panel::show_chart_builder_panel;
use crate::ui::overview_panel::show_overview_panel;
use crate::ui::sheet_dialog::{show_sheet_dialog, SheetDialogResult, SheetSelectionState};
use crate::ui::PanelAction;

const DATA_EXTENSIONS: [&str; 6] = ["csv", "xls", "xlsx", "xlsm", "xlsb", "ods"];
const REPORT_FILE_NAME: &str = "smart_csv_report.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    CustomChart,
}

/// File load running on a worker thread.
struct PendingLoad {
    label: String,
    handle: JoinHandle<Result<LoadOutcome>>,
}

/// Collect a finished load; a panicking loader becomes a parse error.
fn join_load(handle: JoinHandle<Result<LoadOutcome>>) -> Result<LoadOutcome> {
    handle.join().unwrap_or_else(|_| {
        Err(AnalyzerError::FileParse {
            message: "loader thread panicked".to_string(),
        })
    })
}

/// The dashboard application.
pub struct DashboardApp {
    pub settings: Settings,
    pub session: Option<Session>,
    tab: Tab,
    /// Sheet picker for multi-sheet workbooks.
    sheet_dialog: Option<SheetSelectionState>,
    /// An error message shown in the footer until dismissed.
    pub error_message: Option<String>,
    /// Last successful action, shown in the footer.
    status: Option<String>,
    show_about: bool,
    pending_load: Option<PendingLoad>,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::default();

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.text_styles.insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        ctx.set_style(style);
        ctx.set_visuals(styled_visuals(&settings));

        Self {
            settings,
            session: None,
            tab: Tab::Overview,
            sheet_dialog: None,
            error_message: None,
            status: None,
            show_about: false,
            pending_load: None,
        }
    }

    fn report_error(&mut self, context: &str, e: &AnalyzerError) {
        tracing::error!("{context}: {e}");
        self.error_message = Some(format!("{context}: {e}"));
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Data Files", &DATA_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Parse a data file on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        let path_buf = path.to_path_buf();
        self.spawn_load(display_name(path), move || loader::open(&path_buf));
    }

    fn load_sheet(&mut self, path: PathBuf, sheet: String) {
        let label = format!("{} [{}]", display_name(&path), sheet);
        self.spawn_load(label, move || loader::load_sheet(&path, &sheet).map(LoadOutcome::Table));
    }

    fn spawn_load(
        &mut self,
        label: String,
        job: impl FnOnce() -> Result<LoadOutcome> + Send + 'static,
    ) {
        let handle = std::thread::spawn(job);
        tracing::info!("Loading {label}");
        self.pending_load = Some(PendingLoad { label, handle });
    }

    fn poll_pending_load(&mut self) {
        if !self
            .pending_load
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished())
        {
            return;
        }
        let Some(PendingLoad { label, handle }) = self.pending_load.take() else {
            return;
        };
        let result = join_load(handle);

        match result {
            Ok(LoadOutcome::Table(loaded)) => {
                self.session = Some(Session::new(loaded));
                self.tab = Tab::Overview;
                self.error_message = None;
                self.status = Some(format!("Loaded {label}"));
            }
            Ok(LoadOutcome::ChooseSheet { path, sheets }) => {
                self.sheet_dialog = Some(SheetSelectionState::new(path, sheets));
            }
            Err(e) => self.report_error("Failed to load file", &e),
        }
    }

    fn save_settings(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("analyzer_settings.json")
            .add_filter("Settings", &[SETTINGS_EXTENSION])
            .save_file()
        {
            if let Err(e) = self.settings.save(&path) {
                self.report_error("Failed to save settings", &e);
            }
        }
    }

    fn load_settings(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Settings", &[SETTINGS_EXTENSION])
            .pick_file()
        {
            match Settings::load(&path) {
                Ok(settings) => {
                    self.settings = settings;
                    if let Some(session) = &mut self.session {
                        session.invalidate_distributions();
                    }
                }
                Err(e) => self.report_error("Failed to load settings", &e),
            }
        }
    }

    fn save_png(&mut self, figure: &Figure, file_name: &str) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter("PNG Image", &["png"])
            .save_file()
        else {
            return;
        };
        let written = render_png(figure, self.settings.download_dpi)
            .and_then(|png| std::fs::write(&path, png).map_err(AnalyzerError::from));
        match written {
            Ok(()) => {
                tracing::info!("Saved chart to {:?}", path);
                self.status = Some(format!("Saved {}", display_name(&path)));
            }
            Err(e) => self.report_error("Failed to save image", &e),
        }
    }

    fn copy_png(&mut self, figure: &Figure) {
        match copy_to_clipboard(figure, self.settings.download_dpi) {
            Ok(()) => {
                tracing::info!("Copied chart to clipboard");
                self.status = Some("Chart copied to clipboard".to_string());
            }
            Err(e) => self.report_error("Failed to copy to clipboard", &e),
        }
    }

    fn export_pdf(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let charts = session.report_charts(self.settings.accent);
        let bytes = match export_report(&session.report_input(&charts, self.settings.report_dpi)) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.report_error("Failed to build report", &e);
                return;
            }
        };

        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(REPORT_FILE_NAME)
            .add_filter("PDF Document", &["pdf"])
            .save_file()
        {
            match std::fs::write(&path, bytes) {
                Ok(()) => {
                    tracing::info!("Exported report to {:?}", path);
                    self.status = Some(format!("Exported {}", display_name(&path)));
                }
                Err(e) => self.report_error("Failed to write report", &AnalyzerError::from(e)),
            }
        }
    }

    fn handle_actions(&mut self, actions: Vec<PanelAction>) {
        for action in actions {
            match action {
                PanelAction::SavePng { figure, file_name } => self.save_png(&figure, &file_name),
                PanelAction::CopyPng(figure) => self.copy_png(&figure),
                PanelAction::ExportReport => self.export_pdf(),
            }
        }
    }

    fn style_menu(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Customize the accent color for your charts.").weak());
        let preset = self.settings.accent_preset.clone().unwrap_or_else(|| "Custom".to_string());
        egui::ComboBox::from_id_salt("accent_preset")
            .selected_text(preset)
            .show_ui(ui, |ui| {
                for (name, color) in ACCENT_PRESETS {
                    let selected = self.settings.accent == color;
                    if ui.selectable_label(selected, name).clicked() {
                        self.settings.apply_preset(name);
                    }
                }
            });
        ui.horizontal(|ui| {
            ui.label("Custom color");
            let mut rgb = self.settings.accent.to_array();
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                self.settings.set_accent(crate::chart::color::Rgb::from_array(rgb));
            }
        });
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn styled_visuals(settings: &Settings) -> egui::Visuals {
    let mut vis = settings.theme.visuals();
    vis.window_corner_radius = egui::CornerRadius::same(8);
    vis.widgets.noninteractive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.active.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.open.corner_radius = egui::CornerRadius::same(6);
    vis.selection.bg_fill = settings.accent.color32().gamma_multiply(0.8);
    vis
}

fn copy_to_clipboard(figure: &Figure, dpi: u32) -> Result<()> {
    let png = render_png(figure, dpi)?;
    let rgba = image::load_from_memory(&png)
        .map_err(|e| AnalyzerError::Render { message: e.to_string() })?
        .to_rgba8();
    let export = |e: arboard::Error| AnalyzerError::Export { message: e.to_string() };
    let mut clipboard = arboard::Clipboard::new().map_err(export)?;
    clipboard
        .set_image(arboard::ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: std::borrow::Cow::Owned(rgba.into_raw()),
        })
        .map_err(export)
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(styled_visuals(&self.settings));

        // ------------------------------------------------------------------
        // 1. Dropped files
        // ------------------------------------------------------------------
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .find(|p| loader::is_supported(p))
        });
        if let Some(path) = dropped {
            self.load_file(&path);
        }

        // ------------------------------------------------------------------
        // 2. Header
        // ------------------------------------------------------------------
        let mut open_file = false;
        let mut save_settings = false;
        let mut load_settings = false;
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let heading = ui.heading("Smart Data Analyzer");
                    heading.context_menu(|ui| {
                        if ui.button("About").clicked() {
                            self.show_about = true;
                            ui.close_menu();
                        }
                    });
                    ui.separator();

                    if ui.button("Open File").clicked() {
                        open_file = true;
                    }
                    ui.menu_button("Style Options", |ui| self.style_menu(ui));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.settings.theme.toggle() {
                            crate::state::theme::Theme::Dark => "Dark Mode",
                            crate::state::theme::Theme::Light => "Light Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.settings.theme = self.settings.theme.toggle();
                        }
                        if ui.button("Load Settings").clicked() {
                            load_settings = true;
                        }
                        if ui.button("Save Settings").clicked() {
                            save_settings = true;
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });
        if open_file {
            self.open_file_dialog();
        }
        if save_settings {
            self.save_settings();
        }
        if load_settings {
            self.load_settings();
        }

        // ------------------------------------------------------------------
        // 3. Footer
        // ------------------------------------------------------------------
        egui::TopBottomPanel::bottom("footer")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(16, 6)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match &self.session {
                        Some(session) => {
                            ui.label(egui::RichText::new(session.title()).strong());
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} rows, {} columns",
                                    session.table().row_count(),
                                    session.table().column_count()
                                ))
                                .weak(),
                            );
                        }
                        None => {
                            ui.label(egui::RichText::new("No file loaded").weak());
                        }
                    }
                    if let Some(status) = &self.status {
                        ui.separator();
                        ui.label(egui::RichText::new(status).weak());
                    }
                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        // ------------------------------------------------------------------
        // 4. Central panel
        // ------------------------------------------------------------------
        let accent = self.settings.accent;
        let theme = self.settings.theme;
        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &mut self.session else {
                ui.add_space(80.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Welcome to Smart Data Analyzer");
                    ui.add_space(12.0);
                    ui.label(
                        egui::RichText::new(
                            "Click \"Open File\" or drag-and-drop a CSV / Excel file to begin.",
                        )
                        .weak(),
                    );
                });
                return;
            };

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Overview, "Overview");
                ui.selectable_value(&mut self.tab, Tab::CustomChart, "Custom Chart");
            });
            ui.separator();

            actions = match self.tab {
                Tab::Overview => show_overview_panel(ui, session, accent, &theme),
                Tab::CustomChart => show_chart_builder_panel(ui, session, accent, &theme),
            };
        });
        self.handle_actions(actions);

        // ------------------------------------------------------------------
        // 5. Async load
        // ------------------------------------------------------------------
        self.poll_pending_load();
        if let Some(pending) = &self.pending_load {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("Loading {}...", pending.label));
                    });
                });
            ctx.request_repaint();
        }

        // ------------------------------------------------------------------
        // 6. Sheet dialog
        // ------------------------------------------------------------------
        let mut chosen = None;
        if let Some(dialog) = &mut self.sheet_dialog {
            match show_sheet_dialog(ctx, dialog) {
                Some(SheetDialogResult::Ok { path, sheet }) => chosen = Some((path, sheet)),
                Some(SheetDialogResult::Cancel) => self.sheet_dialog = None,
                None => {}
            }
        }
        if let Some((path, sheet)) = chosen {
            self.sheet_dialog = None;
            self.load_sheet(path, sheet);
        }

        // ------------------------------------------------------------------
        // 7. About window (hidden menu)
        // ------------------------------------------------------------------
        if self.show_about {
            egui::Window::new("About Smart Data Analyzer")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.label(format!("Version: {VERSION}"));
                    ui.add_space(4.0);
                    ui.label(
                        "Explore CSV and Excel files with automatic insights, descriptive \
                         statistics, distribution charts, a custom chart builder and PDF \
                         reports.",
                    );
                    ui.add_space(10.0);
                    ui.label("Right-click the title for this menu.");
                });
        }
    }
}
