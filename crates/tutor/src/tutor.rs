//! The Tutor: owns the archive and runs every workflow against it.
//!
//! Mutations are transactional: the change is made on a copy, the copy is
//! saved, and only then does it replace the live archive. A provider
//! failure therefore leaves nothing behind, and a save failure is reported
//! as a failed operation with the live archive unchanged.

use crate::history;
use crate::image::ImageAttachment;
use crate::prompts::{self, MIN_PROBLEMS_FOR_PROGRESS, QuizRequest};
use mathdesk_config::AppConfig;
use mathdesk_core::archive::Archive;
use mathdesk_core::error::{Error, Result};
use mathdesk_core::message::Message;
use mathdesk_core::provider::{Provider, ProviderRequest};
use mathdesk_core::record::{IMAGE_ANALYSIS_LABEL, Record};
use mathdesk_core::store::ArchiveStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Model names and sampling options used for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorSettings {
    pub text_model: String,
    pub vision_model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl TutorSettings {
    /// Take models and options from configuration. A `default_model` under
    /// the default provider's own section wins over the top-level one.
    pub fn from_config(config: &AppConfig) -> Self {
        let text_model = config
            .providers
            .get(&config.default_provider)
            .and_then(|p| p.default_model.clone())
            .unwrap_or_else(|| config.default_model.clone());

        Self {
            text_model,
            vision_model: config.vision.model.clone(),
            temperature: config.default_temperature,
            max_tokens: config.default_max_tokens,
        }
    }
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct Tutor {
    archive: Archive,
    store: Arc<dyn ArchiveStore>,
    text: Arc<dyn Provider>,
    vision: Option<Arc<dyn Provider>>,
    settings: TutorSettings,
}

impl Tutor {
    /// Load the archive from `store` and get ready to serve requests.
    pub async fn open(
        store: Arc<dyn ArchiveStore>,
        text: Arc<dyn Provider>,
        settings: TutorSettings,
    ) -> Result<Self> {
        let archive = store.load().await?;
        info!(
            store = store.name(),
            provider = text.name(),
            students = archive.len(),
            "Tutor ready"
        );
        Ok(Self {
            archive,
            store,
            text,
            vision: None,
            settings,
        })
    }

    /// Enable photographed-mistake analysis.
    pub fn with_vision(mut self, provider: Arc<dyn Provider>) -> Self {
        self.vision = Some(provider);
        self
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Student names in sorted order.
    pub fn students(&self) -> Vec<String> {
        self.archive.students().map(String::from).collect()
    }

    pub fn history(&self, name: &str) -> Result<&[Record]> {
        self.archive
            .history(name)
            .ok_or_else(|| Error::UnknownStudent(name.to_string()))
    }

    /// Open an empty history for a new student and persist it.
    pub async fn create_student(&mut self, name: &str) -> Result<()> {
        let mut next = self.archive.clone();
        next.create_student(name)?;
        self.commit(next).await?;
        info!(student = name, "Student created");
        Ok(())
    }

    /// Analyze a typed-in mistake with the student's whole history as context.
    ///
    /// On success the problem and the analysis are appended as a pair.
    pub async fn analyze_mistake(&mut self, name: &str, problem: &str) -> Result<String> {
        if problem.trim().is_empty() {
            return Err(Error::validation("problem text must not be empty"));
        }
        let prior = self.history(name)?;
        let messages =
            history::assemble(prompts::MISTAKE_SYSTEM, prior, Message::user(problem));
        debug!(student = name, prior = prior.len(), "Analyzing mistake");

        let provider = self.text.clone();
        let model = self.settings.text_model.clone();
        let analysis = self.ask(provider.as_ref(), &model, messages).await?;

        let mut next = self.archive.clone();
        next.append_records(
            name,
            [Record::user(problem), Record::assistant(analysis.clone())],
        )?;
        self.commit(next).await?;
        info!(student = name, "Mistake analysis recorded");
        Ok(analysis)
    }

    /// Analyze a photographed mistake. Each photo is read on its own: no
    /// earlier exchange is sent along with it.
    pub async fn analyze_image(
        &mut self,
        name: &str,
        image: &ImageAttachment,
        note: Option<&str>,
    ) -> Result<String> {
        let provider = self.vision.clone().ok_or_else(|| Error::Config {
            message: "image analysis needs a vision provider ([vision] in config.toml)".into(),
        })?;
        if image.is_empty() {
            return Err(Error::validation("image is empty"));
        }
        if !self.archive.contains(name) {
            return Err(Error::UnknownStudent(name.to_string()));
        }

        let note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(prompts::IMAGE_DEFAULT_NOTE);
        let messages = history::single_turn(
            prompts::IMAGE_SYSTEM,
            Message::user_with_image(image.to_data_uri(), note),
        );
        debug!(
            student = name,
            format = image.format().mime_type(),
            bytes = image.len(),
            "Analyzing photo"
        );

        let model = self.settings.vision_model.clone();
        let analysis = self.ask(provider.as_ref(), &model, messages).await?;

        let mut next = self.archive.clone();
        next.append_records(
            name,
            [Record::image_analysis(IMAGE_ANALYSIS_LABEL, analysis.clone())],
        )?;
        self.commit(next).await?;
        info!(student = name, "Photo analysis recorded");
        Ok(analysis)
    }

    /// Summarize a student's progress from every problem submitted so far.
    pub async fn progress_report(&self, name: &str) -> Result<String> {
        let problems: Vec<String> = self
            .archive
            .problem_texts(name)
            .ok_or_else(|| Error::UnknownStudent(name.to_string()))?
            .into_iter()
            .map(String::from)
            .collect();

        if problems.len() < MIN_PROBLEMS_FOR_PROGRESS {
            return Err(Error::validation(format!(
                "a progress report needs at least {MIN_PROBLEMS_FOR_PROGRESS} submitted problems ({name} has {})",
                problems.len()
            )));
        }

        let messages = vec![Message::user(prompts::progress_prompt(name, &problems))];
        debug!(student = name, problems = problems.len(), "Building progress report");
        self.ask(self.text.as_ref(), &self.settings.text_model, messages)
            .await
    }

    /// Full-marks solution and teaching notes for an exam question.
    pub async fn lecture_prep(&self, exam: &str) -> Result<String> {
        if exam.trim().is_empty() {
            return Err(Error::validation("exam text must not be empty"));
        }
        let messages = history::single_turn(prompts::LECTURE_PREP_SYSTEM, Message::user(exam));
        self.ask(self.text.as_ref(), &self.settings.text_model, messages)
            .await
    }

    /// Generate a topic quiz with answers.
    pub async fn generate_quiz(&self, request: &QuizRequest) -> Result<String> {
        request.validate()?;
        let messages = vec![Message::user(prompts::quiz_prompt(request))];
        debug!(
            topic = %request.topic,
            count = request.count,
            difficulty = %request.difficulty,
            "Generating quiz"
        );
        self.ask(self.text.as_ref(), &self.settings.text_model, messages)
            .await
    }

    /// Generate a paper parallel to `paper`: same structure, new numbers.
    pub async fn generate_parallel_exam(&self, paper: &str) -> Result<String> {
        if paper.trim().is_empty() {
            return Err(Error::validation("exam paper must not be empty"));
        }
        let messages = vec![Message::user(prompts::parallel_exam_prompt(paper))];
        self.ask(self.text.as_ref(), &self.settings.text_model, messages)
            .await
    }

    /// Persist `next`, then make it the live archive.
    async fn commit(&mut self, next: Archive) -> Result<()> {
        if let Err(e) = self.store.save(&next).await {
            warn!(store = self.store.name(), error = %e, "Archive save failed; change discarded");
            return Err(e.into());
        }
        self.archive = next;
        Ok(())
    }

    async fn ask(
        &self,
        provider: &dyn Provider,
        model: &str,
        messages: Vec<Message>,
    ) -> Result<String> {
        let request = ProviderRequest::new(model, messages)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let response = provider.complete(request).await.map_err(|e| {
            warn!(provider = provider.name(), error = %e, "Completion failed");
            Error::from(e)
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                provider = provider.name(),
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }
        Ok(response.content)
    }
}
