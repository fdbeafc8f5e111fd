// Copyright 2023 Remi Bernotavicius

use super::{report_error, Session, UpdateEvent};
use crate::access::EditorCapability;
use crate::aggregate::Week;
use crate::database;
use crate::shopping::ShoppingList;
use eframe::egui;

pub struct ShoppingWindow {
    list: Option<ShoppingList>,
    loaded: Option<(Week, u64)>,
}

impl ShoppingWindow {
    pub fn new() -> Self {
        Self {
            list: None,
            loaded: None,
        }
    }

    fn refresh(
        &mut self,
        conn: &mut database::Connection,
        session: &Session,
        toasts: &mut egui_toast::Toasts,
    ) {
        let key = (session.week, session.revision);
        if self.loaded == Some(key) {
            return;
        }
        self.loaded = Some(key);

        match ShoppingList::build(conn, session.week) {
            Ok(list) => self.list = Some(list),
            Err(error) => {
                self.list = None;
                report_error(toasts, "Failed to build shopping list", error);
            }
        }
    }

    fn update_list(
        &mut self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: Option<&EditorCapability>,
        toasts: &mut egui_toast::Toasts,
    ) {
        let Some(list) = &mut self.list else {
            return;
        };
        if list.is_empty() {
            ui.label("Nothing planned this week.");
            return;
        }

        ui.strong(format!("Shopping for the week of {}", list.week().start().format("%d/%m/%Y")));
        let progress = list.progress();
        ui.add(egui::ProgressBar::new(progress.fraction()).text(format!(
            "{} of {} bought",
            progress.checked, progress.total
        )));

        let mut toggled = vec![];
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (category, items) in list.categories() {
                egui::CollapsingHeader::new(category)
                    .default_open(true)
                    .show(ui, |ui| {
                        for item in items {
                            let mut checked = item.checked;
                            ui.add_enabled(
                                editor.is_some(),
                                egui::Checkbox::new(&mut checked, item.label()),
                            );
                            if checked != item.checked {
                                toggled.push((item.name.clone(), checked));
                            }
                        }
                    });
            }
        });

        let Some(editor) = editor else {
            return;
        };
        for (name, checked) in toggled {
            if let Err(error) = list.set_checked(conn, editor, &name, checked) {
                report_error(toasts, "Failed to save shopping list", error);
            }
        }

        ui.separator();
        if ui.button("Clear Week").clicked() {
            if let Err(error) = list.clear(conn, editor) {
                report_error(toasts, "Failed to clear shopping list", error);
            }
        }
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        session: &mut Session,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        self.refresh(conn, session, toasts);

        let mut open = true;
        egui::Window::new("Shopping List")
            .open(&mut open)
            .show(ctx, |ui| {
                super::week_navigation(ui, &mut session.week);
                ui.separator();
                self.update_list(ui, conn, session.capability.editor(), toasts);
            });

        let mut events = vec![];
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
