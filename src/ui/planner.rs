// Copyright 2023 Remi Bernotavicius

use super::{new_error_toast, new_info_toast, report_error, Session, UpdateEvent};
use crate::access::EditorCapability;
use crate::aggregate::Week;
use crate::database;
use crate::database::models::{MealSlot, RecipeHandle};
use crate::pantry;
use crate::planner::{self, CopyOutcome, WeekGrid};
use eframe::egui;

pub struct PlannerWindow {
    grid: Option<WeekGrid>,
    recipes: Vec<RecipeHandle>,
    loaded: Option<(Week, u64)>,
}

impl PlannerWindow {
    pub fn new() -> Self {
        Self {
            grid: None,
            recipes: vec![],
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

        match planner::load_week(conn, session.week) {
            Ok(grid) => self.grid = Some(grid),
            Err(error) => {
                self.grid = None;
                report_error(toasts, "Failed to load week", error);
            }
        }
        match pantry::recipes(conn) {
            Ok(recipes) => self.recipes = recipes.iter().map(|r| r.to_handle()).collect(),
            Err(error) => report_error(toasts, "Failed to load recipes", error),
        }
    }

    fn update_cell(
        &self,
        ui: &mut egui::Ui,
        grid: &WeekGrid,
        day: chrono::NaiveDate,
        slot: MealSlot,
    ) -> Option<Option<database::models::RecipeId>> {
        let current = grid.get(day, slot);
        let before = current.map(|r| r.id);
        let mut selected = before;
        egui::ComboBox::from_id_salt(("planned meal", day, slot))
            .selected_text(current.map(|r| r.name.as_str()).unwrap_or(""))
            .width(130.0)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, None, "");
                for recipe in &self.recipes {
                    ui.selectable_value(&mut selected, Some(recipe.id), recipe.name.as_str());
                }
            });
        (selected != before).then_some(selected)
    }

    fn update_grid(
        &self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: Option<&EditorCapability>,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        let Some(grid) = &self.grid else {
            return;
        };
        let week = grid.week();
        if grid.is_empty() {
            ui.label("Nothing planned yet.");
        } else {
            ui.label(format!("{} meals planned", grid.len()));
        }
        ui.add_enabled_ui(editor.is_some(), |ui| {
            egui::Grid::new("week grid").striped(true).show(ui, |ui| {
                ui.label("");
                for day in week.days() {
                    ui.vertical_centered(|ui| {
                        ui.strong(day.format("%A").to_string());
                        ui.label(day.format("%d/%m").to_string());
                    });
                }
                ui.end_row();

                for slot in MealSlot::iter() {
                    ui.label(slot.to_string());
                    for day in week.days() {
                        let Some(choice) = self.update_cell(ui, grid, day, slot) else {
                            continue;
                        };
                        let Some(editor) = editor else {
                            continue;
                        };
                        match planner::assign(conn, editor, day, slot, choice) {
                            Ok(()) => events.push(UpdateEvent::Changed),
                            Err(error) => report_error(toasts, "Failed to save meal", error),
                        }
                    }
                    ui.end_row();
                }
            });
        });
    }

    fn copy_forward(
        &self,
        conn: &mut database::Connection,
        editor: &EditorCapability,
        week: Week,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        match planner::copy_week_forward(conn, editor, week) {
            Ok(outcome @ CopyOutcome::Copied(_)) => {
                toasts.add(new_info_toast(outcome.message()));
                events.push(UpdateEvent::Changed);
            }
            Ok(outcome) => {
                toasts.add(new_error_toast(outcome.message()));
            }
            Err(error) => report_error(toasts, "Failed to copy week", error),
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

        let mut events = vec![];
        let mut open = true;
        egui::Window::new("Planner")
            .open(&mut open)
            .default_width(1000.0)
            .show(ctx, |ui| {
                super::week_navigation(ui, &mut session.week);
                let editor = session.capability.editor();
                if let Some(editor) = editor {
                    if ui.button("Copy to Next Week").clicked() {
                        self.copy_forward(conn, editor, session.week, toasts, &mut events);
                    }
                }
                ui.separator();
                self.update_grid(ui, conn, editor, toasts, &mut events);
            });
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
