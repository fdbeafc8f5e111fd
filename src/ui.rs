// Copyright 2023 Remi Bernotavicius

use crate::access::Capability;
use crate::aggregate::Week;
use crate::config::Config;
use crate::database;
use crate::database::models::IngredientCategory;
use eframe::egui;
use std::hash::Hash;

mod ingredients;
mod maintenance;
mod planner;
mod recipes;
mod shopping;

pub fn new_error_toast(text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    egui_toast::Toast {
        text: text.into(),
        kind: egui_toast::ToastKind::Error,
        options: egui_toast::ToastOptions::default()
            .duration_in_seconds(3.0)
            .show_progress(false)
            .show_icon(true),
        ..Default::default()
    }
}

pub fn new_info_toast(text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    egui_toast::Toast {
        text: text.into(),
        kind: egui_toast::ToastKind::Success,
        options: egui_toast::ToastOptions::default()
            .duration_in_seconds(2.0)
            .show_progress(false)
            .show_icon(true),
        ..Default::default()
    }
}

fn report_error(toasts: &mut egui_toast::Toasts, what: &str, error: impl std::fmt::Display) {
    log::error!("{what}: {error}");
    toasts.add(new_error_toast(format!("{what}: {error}")));
}

pub enum UpdateEvent {
    Closed,
    Changed,
}

/// Everything about the person using the app that the windows need to know: what they are
/// allowed to do and which week they are looking at.
pub struct Session {
    pub capability: Capability,
    pub week: Week,
    /// Bumped every time something is written, so windows know to reload.
    pub revision: u64,
}

fn week_navigation(ui: &mut egui::Ui, week: &mut Week) {
    ui.horizontal(|ui| {
        if ui.button("Previous").clicked() {
            *week = week.previous();
        }
        let mut date = week.start();
        ui.add(egui_extras::DatePickerButton::new(&mut date));
        if date != week.start() {
            week.jump_to(date);
        }
        if ui.button("Next").clicked() {
            *week = week.next();
        }
        if ui.button("This Week").clicked() {
            *week = Week::this_week();
        }
    });
    ui.label(format!(
        "Week of {} to {}",
        week.start().format("%d/%m/%Y"),
        week.end().format("%d/%m/%Y")
    ));
}

fn category_picker(ui: &mut egui::Ui, id_salt: impl Hash, category: &mut IngredientCategory) {
    egui::ComboBox::from_id_salt(id_salt)
        .selected_text(category.to_string())
        .show_ui(ui, |ui| {
            for c in IngredientCategory::iter() {
                ui.selectable_value(category, c, c.to_string());
            }
        });
}

pub struct MealPlanner {
    conn: database::Connection,
    config: Config,
    key_input: String,
    session: Session,
    toasts: egui_toast::Toasts,
    planner_window: Option<planner::PlannerWindow>,
    shopping_window: Option<shopping::ShoppingWindow>,
    recipes_window: Option<recipes::RecipesWindow>,
    ingredients_window: Option<ingredients::IngredientsWindow>,
    maintenance_window: Option<maintenance::MaintenanceWindow>,
}

impl MealPlanner {
    pub fn new(conn: database::Connection, config: Config) -> Self {
        Self {
            conn,
            config,
            key_input: String::new(),
            session: Session {
                capability: Capability::Reader,
                week: Week::this_week(),
                revision: 0,
            },
            toasts: egui_toast::Toasts::new()
                .anchor(egui::Align2::RIGHT_BOTTOM, (-10.0, -10.0))
                .direction(egui::Direction::BottomUp),
            planner_window: Some(planner::PlannerWindow::new()),
            shopping_window: None,
            recipes_window: None,
            ingredients_window: None,
            maintenance_window: None,
        }
    }

    fn handle_events(&mut self, events: Vec<UpdateEvent>) -> bool {
        let mut closed = false;
        for event in events {
            match event {
                UpdateEvent::Closed => closed = true,
                UpdateEvent::Changed => self.session.revision += 1,
            }
        }
        closed
    }

    fn update_access_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("access").show(ctx, |ui| {
            ui.heading("Access");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.key_input)
                    .password(true)
                    .hint_text("editor key"),
            );
            if response.changed() {
                self.session.capability =
                    Capability::authorize(self.config.editor_key.as_deref(), &self.key_input);
                if !self.session.capability.is_editor() {
                    self.maintenance_window = None;
                }
            }
            if self.session.capability.is_editor() {
                ui.label("Editing enabled");
            } else {
                ui.label("Read only");
            }
        });
    }

    fn update_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let editor = self.session.capability.is_editor();
                    if ui
                        .add_enabled(editor, egui::Button::new("Maintenance"))
                        .clicked()
                        && self.maintenance_window.is_none()
                    {
                        self.maintenance_window = Some(maintenance::MaintenanceWindow::new());
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Planner").clicked() && self.planner_window.is_none() {
                        self.planner_window = Some(planner::PlannerWindow::new());
                        ui.close_menu();
                    }
                    if ui.button("Shopping List").clicked() && self.shopping_window.is_none() {
                        self.shopping_window = Some(shopping::ShoppingWindow::new());
                        ui.close_menu();
                    }
                    if ui.button("Recipes").clicked() && self.recipes_window.is_none() {
                        self.recipes_window = Some(recipes::RecipesWindow::new());
                        ui.close_menu();
                    }
                    if ui.button("Ingredients").clicked() && self.ingredients_window.is_none() {
                        self.ingredients_window = Some(ingredients::IngredientsWindow::new());
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn update_planner_window(&mut self, ctx: &egui::Context) {
        if let Some(window) = &mut self.planner_window {
            let events = window.update(ctx, &mut self.conn, &mut self.session, &mut self.toasts);
            if self.handle_events(events) {
                self.planner_window = None;
            }
        }
    }

    fn update_shopping_window(&mut self, ctx: &egui::Context) {
        if let Some(window) = &mut self.shopping_window {
            let events = window.update(ctx, &mut self.conn, &mut self.session, &mut self.toasts);
            if self.handle_events(events) {
                self.shopping_window = None;
            }
        }
    }

    fn update_recipes_window(&mut self, ctx: &egui::Context) {
        if let Some(window) = &mut self.recipes_window {
            let events = window.update(ctx, &mut self.conn, &self.session, &mut self.toasts);
            if self.handle_events(events) {
                self.recipes_window = None;
            }
        }
    }

    fn update_ingredients_window(&mut self, ctx: &egui::Context) {
        if let Some(window) = &mut self.ingredients_window {
            let events = window.update(ctx, &mut self.conn, &self.session, &mut self.toasts);
            if self.handle_events(events) {
                self.ingredients_window = None;
            }
        }
    }

    fn update_maintenance_window(&mut self, ctx: &egui::Context) {
        let Some(editor) = self.session.capability.editor() else {
            return;
        };
        if let Some(window) = &mut self.maintenance_window {
            let events = window.update(ctx, &mut self.conn, editor, &mut self.toasts);
            if self.handle_events(events) {
                self.maintenance_window = None;
            }
        }
    }
}

impl eframe::App for MealPlanner {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_menu(ctx);
        self.update_access_panel(ctx);
        self.update_planner_window(ctx);
        self.update_shopping_window(ctx);
        self.update_recipes_window(ctx);
        self.update_ingredients_window(ctx);
        self.update_maintenance_window(ctx);
        self.toasts.show(ctx);
    }
}
