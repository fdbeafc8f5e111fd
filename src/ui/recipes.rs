// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report_error, Session, UpdateEvent};
use crate::access::EditorCapability;
use crate::database::models::{Ingredient, IngredientId, Recipe, RecipeId};
use crate::database::{self, query};
use crate::pantry;
use eframe::egui;
use std::collections::BTreeSet;

struct RecipeBeingEdited {
    id: RecipeId,
    is_system: bool,
    name: String,
    ingredients: BTreeSet<IngredientId>,
}

impl RecipeBeingEdited {
    fn load(conn: &mut database::Connection, recipe: &Recipe) -> database::Result<Self> {
        Ok(Self {
            id: recipe.id,
            is_system: recipe.is_system,
            name: recipe.name.clone(),
            ingredients: query::get_recipe_ingredient_ids(conn, recipe.id)?,
        })
    }
}

pub struct RecipesWindow {
    recipes: Vec<Recipe>,
    ingredients: Vec<Ingredient>,
    loaded: Option<u64>,
    selected: Option<RecipeBeingEdited>,
    new_recipe_name: String,
}

impl RecipesWindow {
    pub fn new() -> Self {
        Self {
            recipes: vec![],
            ingredients: vec![],
            loaded: None,
            selected: None,
            new_recipe_name: String::new(),
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

        match pantry::recipes(conn) {
            Ok(recipes) => self.recipes = recipes,
            Err(error) => report_error(toasts, "Failed to load recipes", error),
        }
        match pantry::ingredients(conn) {
            Ok(ingredients) => self.ingredients = ingredients,
            Err(error) => report_error(toasts, "Failed to load ingredients", error),
        }
        if let Some(selected) = &self.selected {
            if !self.recipes.iter().any(|r| r.id == selected.id) {
                self.selected = None;
            }
        }
    }

    fn select(
        &mut self,
        conn: &mut database::Connection,
        id: RecipeId,
        toasts: &mut egui_toast::Toasts,
    ) {
        let Some(recipe) = self.recipes.iter().find(|r| r.id == id) else {
            return;
        };
        match RecipeBeingEdited::load(conn, recipe) {
            Ok(edited) => self.selected = Some(edited),
            Err(error) => report_error(toasts, "Failed to load recipe", error),
        }
    }

    fn update_list(
        &mut self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: Option<&EditorCapability>,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        let selected_id = self.selected.as_ref().map(|s| s.id);
        let mut clicked = None;

        if let Some(system) = self.recipes.iter().find(|r| r.is_system) {
            if ui.button("Standing Shopping Items").clicked() {
                clicked = Some(system.id);
            }
            ui.separator();
        }

        egui::ScrollArea::vertical()
            .id_salt("recipe list")
            .max_height(400.0)
            .show(ui, |ui| {
                for recipe in self.recipes.iter().filter(|r| !r.is_system) {
                    if ui
                        .selectable_label(selected_id == Some(recipe.id), recipe.name.as_str())
                        .clicked()
                    {
                        clicked = Some(recipe.id);
                    }
                }
            });
        if let Some(id) = clicked {
            self.select(conn, id, toasts);
        }

        let Some(editor) = editor else {
            return;
        };
        ui.separator();
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_recipe_name)
                    .hint_text("new recipe")
                    .desired_width(150.0),
            );
            if ui.button("Create").clicked() {
                match pantry::create_recipe(conn, editor, &self.new_recipe_name, &[]) {
                    Ok(id) => {
                        self.selected = Some(RecipeBeingEdited {
                            id,
                            is_system: false,
                            name: self.new_recipe_name.trim().to_owned(),
                            ingredients: BTreeSet::new(),
                        });
                        self.new_recipe_name.clear();
                        events.push(UpdateEvent::Changed);
                    }
                    Err(error) => report_error(toasts, "Failed to create recipe", error),
                }
            }
        });
    }

    fn update_editor(
        &mut self,
        ui: &mut egui::Ui,
        conn: &mut database::Connection,
        editor: Option<&EditorCapability>,
        toasts: &mut egui_toast::Toasts,
        events: &mut Vec<UpdateEvent>,
    ) {
        let Some(selected) = &mut self.selected else {
            ui.label("Select a recipe.");
            return;
        };

        ui.add_enabled_ui(editor.is_some(), |ui| {
            ui.add_enabled(
                !selected.is_system,
                egui::TextEdit::singleline(&mut selected.name),
            );
            if selected.is_system {
                ui.label("These ingredients go on every week's shopping list.");
            }
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("recipe ingredients")
                .max_height(400.0)
                .show(ui, |ui| {
                    for ingredient in &self.ingredients {
                        let mut included = selected.ingredients.contains(&ingredient.id);
                        if ui.checkbox(&mut included, ingredient.name.as_str()).changed() {
                            if included {
                                selected.ingredients.insert(ingredient.id);
                            } else {
                                selected.ingredients.remove(&ingredient.id);
                            }
                        }
                    }
                });
        });

        let Some(editor) = editor else {
            return;
        };
        ui.separator();
        let mut deleted = false;
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                let ids: Vec<_> = selected.ingredients.iter().copied().collect();
                match pantry::update_recipe(conn, editor, selected.id, &selected.name, &ids) {
                    Ok(()) => {
                        toasts.add(new_info_toast(format!("Saved {}", selected.name.trim())));
                        events.push(UpdateEvent::Changed);
                    }
                    Err(error) => report_error(toasts, "Failed to save recipe", error),
                }
            }
            if !selected.is_system && ui.button("Delete").clicked() {
                match pantry::delete_recipe(conn, editor, selected.id) {
                    Ok(()) => {
                        deleted = true;
                        events.push(UpdateEvent::Changed);
                    }
                    Err(error) => report_error(toasts, "Failed to delete recipe", error),
                }
            }
        });
        if deleted {
            self.selected = None;
        }
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
        egui::Window::new("Recipes")
            .open(&mut open)
            .default_width(500.0)
            .show(ctx, |ui| {
                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| {
                        ui.set_width(220.0);
                        self.update_list(ui, conn, editor, toasts, &mut events);
                    });
                    ui.separator();
                    ui.vertical(|ui| {
                        self.update_editor(ui, conn, editor, toasts, &mut events);
                    });
                });
            });
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
