// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report_error, UpdateEvent};
use crate::access::EditorCapability;
use crate::database;
use crate::maintenance;
use eframe::egui;

pub struct MaintenanceWindow {
    confirm_reset: bool,
}

impl MaintenanceWindow {
    pub fn new() -> Self {
        Self {
            confirm_reset: false,
        }
    }

    fn update_backup(
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) {
        let today = chrono::Local::now().date_naive();
        if ui.button("Back Up Database").clicked() {
            if let Some(file) = rfd::FileDialog::new()
                .add_filter("sqlite", &["sqlite"])
                .set_file_name(format!("planner_backup_{today}.sqlite"))
                .save_file()
            {
                match maintenance::backup(conn, &file) {
                    Ok(()) => {
                        toasts.add(new_info_toast(format!("Saved {}", file.display())));
                    }
                    Err(error) => report_error(toasts, "Backup failed", error),
                }
            }
        }
        if ui.button("Export as SQL").clicked() {
            if let Some(file) = rfd::FileDialog::new()
                .add_filter("sql", &["sql"])
                .set_file_name(format!("planner_export_{today}.sql"))
                .save_file()
            {
                match maintenance::export_sql_to_path(conn, &file) {
                    Ok(()) => {
                        toasts.add(new_info_toast(format!("Saved {}", file.display())));
                    }
                    Err(error) => report_error(toasts, "Export failed", error),
                }
            }
        }
    }

    fn update_reset(
        &mut self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: &EditorCapability,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        ui.label("Forget every planned meal and shopping list. Recipes and ingredients are kept.");
        ui.checkbox(&mut self.confirm_reset, "I understand this can't be undone");
        if ui
            .add_enabled(self.confirm_reset, egui::Button::new("Reset History"))
            .clicked()
        {
            self.confirm_reset = false;
            match maintenance::reset_history(conn, editor) {
                Ok(()) => {
                    toasts.add(new_info_toast("History cleared"));
                    events.push(UpdateEvent::Changed);
                }
                Err(error) => report_error(toasts, "Reset failed", error),
            }
        }
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        editor: &EditorCapability,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut events = vec![];
        let mut open = true;
        egui::Window::new("Maintenance")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                Self::update_backup(ui, conn, toasts);
                ui.separator();
                self.update_reset(ui, conn, editor, toasts, &mut events);
            });
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
