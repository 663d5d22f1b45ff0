// src/pipeline.rs
use crate::config::{SessionFile, TemplateFile, DEFAULT_DISPLAY_WIDTH, DEFAULT_EMIT_TIMEOUT};
use crate::emission::EmissionController;
use crate::error::FormmarkError;
use crate::form::FormDocument;
use formmark_core::{
    resolve, AnnotationEmitter, EmitOptions, EmittedDocument, FormSession, LayoutTemplate,
    RenderError, RenderingService, SessionEvent,
};
use formmark_pdf_composer::{HeadlessRenderer, LopdfAuthoring};
use std::path::Path;
use std::time::Duration;

/// A builder for creating a [`FormPipeline`].
pub struct PipelineBuilder {
    template: LayoutTemplate,
    display_width: f32,
    options: EmitOptions,
    timeout: Duration,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            template: LayoutTemplate::default(),
            display_width: DEFAULT_DISPLAY_WIDTH,
            options: EmitOptions::default(),
            timeout: DEFAULT_EMIT_TIMEOUT,
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads the layout template from a JSON file.
    pub fn with_template_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, FormmarkError> {
        self.template = LayoutTemplate::from_json_file(path)?;
        Ok(self)
    }

    pub fn with_template(mut self, template: LayoutTemplate) -> Self {
        self.template = template;
        self
    }

    /// Width in pixels the form is rendered at. Clicks are in this space.
    pub fn with_display_width(mut self, width: f32) -> Self {
        self.display_width = width;
        self
    }

    pub fn with_calibration_guides(mut self, guides: bool) -> Self {
        self.options.calibration_guides = guides;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> FormPipeline {
        let emitter = AnnotationEmitter::new(LopdfAuthoring::new())
            .with_style(self.template.style)
            .with_options(self.options);
        FormPipeline {
            renderer: HeadlessRenderer,
            controller: EmissionController::new(emitter).with_timeout(self.timeout),
            template: self.template,
            display_width: self.display_width,
        }
    }
}

/// Opens forms, replays recorded clicks and writes annotated copies.
pub struct FormPipeline {
    renderer: HeadlessRenderer,
    controller: EmissionController<LopdfAuthoring>,
    template: LayoutTemplate,
    display_width: f32,
}

impl FormPipeline {
    pub fn template(&self) -> &LayoutTemplate {
        &self.template
    }

    /// Renders `form` and returns a session ready to take clicks.
    pub fn open(&self, form: &FormDocument) -> Result<FormSession, FormmarkError> {
        let metrics = self.renderer.render(form.bytes(), self.display_width)?;
        let mut session = FormSession::new(self.template.clone());
        session.dispatch(SessionEvent::RenderComplete(metrics))?;
        Ok(session)
    }

    /// Feeds every click in `file` to `session`, then its quantity if the
    /// click selected a cell. Returns the number of clicks that changed state.
    pub fn replay(&self, session: &mut FormSession, file: &SessionFile) -> Result<usize, FormmarkError> {
        let mut applied = 0;
        for click in &file.clicks {
            let point = click.point();
            if !session.dispatch(SessionEvent::Click(point))? {
                continue;
            }
            applied += 1;

            let Some(text) = &click.quantity else {
                continue;
            };
            let key = session
                .grid()
                .and_then(|grid| resolve(point, grid))
                .map(|address| address.key());
            if let Some(key) = key {
                session.dispatch(SessionEvent::SetQuantity {
                    key,
                    text: text.clone(),
                })?;
            }
        }
        log::info!(
            "Replayed {} of {} click(s); {} selection(s) active.",
            applied,
            file.clicks.len(),
            session.store().len()
        );
        Ok(applied)
    }

    /// Emits the session's current selections onto `form`.
    pub async fn generate(
        &self,
        form: &FormDocument,
        session: &FormSession,
    ) -> Result<EmittedDocument, FormmarkError> {
        let (Some(grid), Some(display)) = (session.grid(), session.display_size()) else {
            return Err(RenderError::Document("form has not been rendered".to_string()).into());
        };
        self.controller
            .emit(form, session.store(), grid, display)
            .await
    }
}
