// Copyright 2023 Remi Bernotavicius

use super::{category_picker, report_error, Session, UpdateEvent};
use crate::access::EditorCapability;
use crate::database;
use crate::database::models::{Ingredient, IngredientCategory, IngredientId};
use crate::pantry;
use eframe::egui;

struct IngredientBeingEdited {
    id: IngredientId,
    name: String,
    category: IngredientCategory,
}

pub struct IngredientsWindow {
    ingredients: Vec<Ingredient>,
    loaded: Option<u64>,
    being_edited: Option<IngredientBeingEdited>,
    new_name: String,
    new_category: IngredientCategory,
}

impl IngredientsWindow {
    pub fn new() -> Self {
        Self {
            ingredients: vec![],
            loaded: None,
            being_edited: None,
            new_name: String::new(),
            new_category: IngredientCategory::default(),
        }
    }

    fn refresh(
        &mut self,
        conn: &mut database::Connection,
        session: &Session,
        toasts: &mut egui_toast::Toasts,
    ) {
        if self.loaded == Some(session.revision) {
            return;
        }
        self.loaded = Some(session.revision);
        match pantry::ingredients(conn) {
            Ok(ingredients) => self.ingredients = ingredients,
            Err(error) => report_error(toasts, "Failed to load ingredients", error),
        }
    }

    fn update_edit_row(
        ui: &mut egui::Ui,
        being_edited: &mut Option<IngredientBeingEdited>,
        conn: &mut database::Connection,
        editor: &EditorCapability,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        let Some(edited) = being_edited.as_mut() else {
            return;
        };
        ui.add(egui::TextEdit::singleline(&mut edited.name).desired_width(150.0));
        category_picker(ui, ("edit category", edited.id), &mut edited.category);
        let mut done = false;
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                match pantry::update_ingredient(
                    conn,
                    editor,
                    edited.id,
                    &edited.name,
                    edited.category,
                ) {
                    Ok(()) => {
                        done = true;
                        events.push(UpdateEvent::Changed);
                    }
                    Err(error) => report_error(toasts, "Failed to save ingredient", error),
                }
            }
            if ui.button("Cancel").clicked() {
                done = true;
            }
        });
        if done {
            *being_edited = None;
        }
    }

    fn update_table(
        &mut self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: Option<&EditorCapability>,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        let mut edit = None;
        let mut delete = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("ingredients").striped(true).show(ui, |ui| {
                ui.strong("Name");
                ui.strong("Category");
                ui.end_row();

                for ingredient in &self.ingredients {
                    let is_being_edited =
                        self.being_edited.as_ref().map(|e| e.id) == Some(ingredient.id);
                    if let (true, Some(editor)) = (is_being_edited, editor) {
                        Self::update_edit_row(
                            ui,
                            &mut self.being_edited,
                            conn,
                            editor,
                            toasts,
                            events,
                        );
                        ui.end_row();
                        continue;
                    }
                    ui.label(ingredient.name.as_str());
                    ui.label(ingredient.category.as_str());
                    if editor.is_some() {
                        ui.horizontal(|ui| {
                            if ui.button("Edit").clicked() {
                                edit = Some(ingredient);
                            }
                            if ui.button("Delete").clicked() {
                                delete = Some(ingredient.id);
                            }
                        });
                    }
                    ui.end_row();
                }
            });
        });

        if let Some(ingredient) = edit {
            self.being_edited = Some(IngredientBeingEdited {
                id: ingredient.id,
                name: ingredient.name.clone(),
                category: IngredientCategory::from_name(&ingredient.category),
            });
        }
        if let (Some(id), Some(editor)) = (delete, editor) {
            match pantry::delete_ingredient(conn, editor, id) {
                Ok(()) => events.push(UpdateEvent::Changed),
                Err(error) => report_error(toasts, "Failed to delete ingredient", error),
            }
        }
    }

    fn update_add_row(
        &mut self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: &EditorCapability,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_name)
                    .hint_text("new ingredient")
                    .desired_width(150.0),
            );
            category_picker(ui, "new category", &mut self.new_category);
            if ui.button("Add").clicked() {
                match pantry::add_ingredient(conn, editor, &self.new_name, self.new_category) {
                    Ok(_) => {
                        self.new_name.clear();
                        events.push(UpdateEvent::Changed);
                    }
                    Err(error) => report_error(toasts, "Failed to add ingredient", error),
                }
            }
        });
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        session: &Session,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        self.refresh(conn, session, toasts);

        let editor = session.capability.editor();
        let mut events = vec![];
        let mut open = true;
        egui::Window::new("Ingredients")
            .open(&mut open)
            .show(ctx, |ui| {
                if let Some(editor) = editor {
                    self.update_add_row(ui, conn, editor, toasts, &mut events);
                    ui.separator();
                }
                self.update_table(ui, conn, editor, toasts, &mut events);
            });
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
