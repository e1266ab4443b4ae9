//! The options form.
//!
//! [`OptionsPage::render`] rebuilds the form from [`OPTION_DATA`] and the
//! saved values; [`OptionsPage::submit`] writes an edited copy of that form
//! back to the store and renders again.
//!
//! Submission keeps every non-button control that has a name and a value.

use crate::dom::{Child, Element, Node, class_names, el};
use crate::errors::StoreError;
use crate::options::{
    self, ControlKind, OPTION_DATA, OptionDescriptor, OptionsStore, SavedOptions, SelectOption,
};
use crate::tts::TtsClient;

/// Class of the loading indicator.
pub const LOADER_CLASS_NAME: &str = "loader";

/// Banner shown when the voice list was refused with a 400.
pub const BAD_KEY_BANNER: &str = "The supplied API key doesn't work.";

/// Where the page is in its render/submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Rendered,
    Submitting,
}

/// Renders and submits the options form.
#[derive(Debug)]
pub struct OptionsPage<S> {
    store: S,
    tts: TtsClient,
    form: Element,
    state: PageState,
}

impl<S: OptionsStore> OptionsPage<S> {
    pub fn new(store: S, tts: TtsClient) -> Self {
        Self {
            store,
            tts,
            form: Element::new("form"),
            state: PageState::Loading,
        }
    }

    /// The form as last rendered.
    pub fn form(&self) -> &Element {
        &self.form
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuilds the form from the saved options.
    ///
    /// A field whose option producer fails or yields nothing is left out;
    /// the rest of the form still renders.
    ///
    /// ## Errors
    ///
    /// Fails only if the saved options cannot be read.
    pub async fn render(&mut self) -> Result<&Element, StoreError> {
        let previous_state = self.state;
        self.state = PageState::Loading;
        self.form.prepend(el(
            "div",
            Some(&[("class", Some(LOADER_CLASS_NAME))]),
            ["Loading options...".into()],
        ));

        let values = match options::saved_options(&self.store).await {
            Ok(values) => values,
            Err(err) => {
                tracing::error!(error = %err, "Failed to load saved options");
                self.remove_loader();
                self.state = previous_state;
                return Err(err);
            }
        };
        let mut fields: Vec<Node> = Vec::new();
        let mut has_400_error = false;

        for descriptor in OPTION_DATA {
            let mut select_options = Vec::new();
            if let Some(source) = descriptor.options {
                match options::produce_options(source, &self.store, &self.tts).await {
                    Ok(produced) => select_options = produced,
                    Err(err) => {
                        tracing::error!(
                            field = descriptor.name,
                            error = %err,
                            "Failed to load field options"
                        );
                        if err.status_code() == Some(400) {
                            has_400_error = true;
                        }
                    }
                }

                // An empty select is useless
                if select_options.is_empty() {
                    tracing::debug!(field = descriptor.name, "Skipping field without options");
                    continue;
                }
            }

            fields.push(render_field(descriptor, &values, &select_options).into());
        }

        fields.push(
            el(
                "button",
                Some(&[("type", Some("submit"))]),
                ["Save".into()],
            )
            .into(),
        );

        if has_400_error {
            fields.insert(
                0,
                el(
                    "p",
                    Some(&[("class", Some("error"))]),
                    [BAD_KEY_BANNER.into()],
                )
                .into(),
            );
        }

        self.form.replace_children(fields);
        self.state = PageState::Rendered;
        Ok(&self.form)
    }

    fn remove_loader(&mut self) {
        let kept = self
            .form
            .children()
            .iter()
            .filter(|node| {
                !node
                    .as_element()
                    .is_some_and(|e| e.attr("class") == Some(LOADER_CLASS_NAME))
            })
            .cloned()
            .collect();
        self.form.replace_children(kept);
    }

    /// Saves the values of `form` and renders again.
    ///
    /// `form` is normally an edited copy of [`OptionsPage::form`].
    ///
    /// ## Errors
    ///
    /// Fails if the store cannot be written or re-read.
    pub async fn submit(&mut self, form: &Element) -> Result<SavedOptions, StoreError> {
        self.state = PageState::Submitting;
        let values = collect_form_values(form);
        tracing::debug!(fields = ?values.keys().collect::<Vec<_>>(), "Submitting options");

        self.store.set(values.clone()).await?;
        self.render().await?;
        Ok(values)
    }
}

/// Builds one `div.field` row.
fn render_field(
    descriptor: &OptionDescriptor,
    values: &SavedOptions,
    select_options: &[SelectOption],
) -> Element {
    let saved = values.get(descriptor.name).map(String::as_str);
    let value = saved
        .filter(|v| !v.is_empty())
        .or(descriptor.default_value)
        .unwrap_or_default();

    let input_type = match descriptor.control {
        ControlKind::Input => Some(descriptor.attr("type").unwrap_or("text")),
        ControlKind::Select => None,
    };
    let class = class_names(&[Some(descriptor.name), descriptor.attr("class")]);

    let mut attrs: Vec<(&str, Option<&str>)> = descriptor
        .attrs
        .iter()
        .filter(|(name, _)| !matches!(*name, "type" | "class"))
        .map(|(name, value)| (*name, Some(*value)))
        .collect();
    attrs.extend([
        ("type", input_type),
        ("name", Some(descriptor.name)),
        ("class", class.as_deref()),
        ("value", Some(value)),
    ]);

    let option_nodes = select_options.iter().map(|opt| {
        let selected = (saved == Some(opt.value.as_str())).then_some("");
        Child::from(el(
            "option",
            Some(&[("value", Some(opt.value.as_str())), ("selected", selected)]),
            [opt.label.as_str().into()],
        ))
    });

    let control = el(
        descriptor.control.tag(),
        Some(attrs.as_slice()),
        option_nodes.collect::<Vec<_>>(),
    );

    let description = descriptor.description.map(|d| {
        el(
            "div",
            None,
            [el(
                "a",
                Some(&[("href", Some(d.href)), ("target", Some(d.target))]),
                [d.text.into()],
            )
            .into()],
        )
    });

    el(
        "div",
        Some(&[("class", Some("field"))]),
        [
            el(
                "label",
                None,
                [el("span", None, [descriptor.label.into()]).into(), control.into()],
            )
            .into(),
            description.into(),
        ],
    )
}

/// Collects the submitted values of a form.
///
/// Every control except buttons is included when it has a `name` and a
/// defined value.
pub fn collect_form_values(form: &Element) -> SavedOptions {
    form.form_controls()
        .into_iter()
        .filter(|control| control.tag() != "button")
        .filter_map(|control| {
            let name = control.attr("name")?;
            let value = control.control_value()?;
            Some((name.to_string(), value))
        })
        .collect()
}
