//! Publish workflow state machine
//!
//! A strict forward pipeline over a semi-hostile third-party UI:
//! `CheckLogin → NavigateHome → OpenComposer → SelectImagePostTab →
//! UploadAsset → AwaitEditorReady → FillTitle → FillBody →
//! ResolveSubmitControl → Submit → AwaitConfirmation`.
//!
//! Every DOM-dependent step declares a natural-language description, an
//! ordered fallback selector list, a resolution order, a failure policy,
//! and a named postcondition in a [`StepSpec`]; no step embeds that choice
//! ad hoc at the call site. Two failure policies exist and are named:
//! [`FailurePolicy::AbortPipeline`] surfaces the originating error and
//! stops, [`FailurePolicy::WarnAndContinue`] records a soft outcome and
//! moves on. Nothing is retried beyond the single explicit upload
//! fallback.

use crate::driver::PageDriver;
use crate::error::Result;
use crate::resolver::ElementResolver;
use redpost_core::{GeneratedPost, RedpostConfig, RedpostError};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// Site constants. These are the hardcoded primary strategy; the element
// resolver is the secondary one when the UI drifts.
const COMPOSER_TRIGGER_TEXT: &str = "发布笔记";
const IMAGE_TAB_TEXT: &str = "上传图文";
const SUBMIT_TEXT: &str = "发布";
const SUCCESS_TOAST_TEXT: &str = "发布成功";
const HOME_URL_FRAGMENT: &str = "/home";
const PUBLISH_URL_FRAGMENT: &str = "/publish/publish";
const FILE_INPUT_SELECTOR: &str = "input[type='file']";
const FILE_INPUT_IMAGE_FALLBACK: &str = "input[accept*='image']";
const TITLE_INPUT_SELECTOR: &str = "input[placeholder*='标题']";
const BODY_EDITOR_SELECTOR: &str = ".ql-editor, #post-textarea, div[contenteditable='true']";

const URL_POLL_INTERVAL_MS: u64 = 250;

/// Stages of one publish attempt, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowStep {
    CheckLogin,
    NavigateHome,
    OpenComposer,
    SelectImagePostTab,
    UploadAsset,
    AwaitEditorReady,
    FillTitle,
    FillBody,
    ResolveSubmitControl,
    Submit,
    AwaitConfirmation,
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStep::CheckLogin => "CheckLogin",
            WorkflowStep::NavigateHome => "NavigateHome",
            WorkflowStep::OpenComposer => "OpenComposer",
            WorkflowStep::SelectImagePostTab => "SelectImagePostTab",
            WorkflowStep::UploadAsset => "UploadAsset",
            WorkflowStep::AwaitEditorReady => "AwaitEditorReady",
            WorkflowStep::FillTitle => "FillTitle",
            WorkflowStep::FillBody => "FillBody",
            WorkflowStep::ResolveSubmitControl => "ResolveSubmitControl",
            WorkflowStep::Submit => "Submit",
            WorkflowStep::AwaitConfirmation => "AwaitConfirmation",
        };
        write!(f, "{}", name)
    }
}

/// What a step failure does to the rest of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Surface the error and stop; remaining steps never run
    AbortPipeline,
    /// Log a warning, record a soft outcome, keep going
    WarnAndContinue,
}

/// Which strategy a step tries first when locating its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrder {
    /// Hardcoded selectors first, AI-assisted lookup as the backstop
    SelectorFirst,
    /// AI-assisted lookup first, hardcoded selectors as the backstop
    ResolverFirst,
}

/// One way of locating an element on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector (alternations allowed)
    Css(&'static str),
    /// Visible-text match
    Text(&'static str),
}

/// Declarative description of a DOM-dependent step
#[derive(Debug, Clone, Copy)]
pub struct StepSpec {
    pub step: WorkflowStep,
    /// Natural-language description handed to the element resolver
    pub description: &'static str,
    /// Ordered fallback locators
    pub fallbacks: &'static [Locator],
    pub order: ResolutionOrder,
    pub policy: FailurePolicy,
    /// Named postcondition the step must establish before the pipeline
    /// advances
    pub postcondition: &'static str,
}

/// Opens the note composer from the creator home page
pub const OPEN_COMPOSER_SPEC: StepSpec = StepSpec {
    step: WorkflowStep::OpenComposer,
    description: "The button that opens the note composer, labeled '发布笔记' or 'Publish note'",
    fallbacks: &[Locator::Text(COMPOSER_TRIGGER_TEXT)],
    order: ResolutionOrder::SelectorFirst,
    policy: FailurePolicy::AbortPipeline,
    postcondition: "composer-url-reached",
};

/// Switches the composer from its default content type to image posts
pub const IMAGE_TAB_SPEC: StepSpec = StepSpec {
    step: WorkflowStep::SelectImagePostTab,
    description: "The composer tab for image-and-text posts, labeled '上传图文'",
    fallbacks: &[Locator::Text(IMAGE_TAB_TEXT)],
    order: ResolutionOrder::SelectorFirst,
    policy: FailurePolicy::WarnAndContinue,
    postcondition: "image-tab-active",
};

/// Attaches the asset to the hidden file input
pub const UPLOAD_SPEC: StepSpec = StepSpec {
    step: WorkflowStep::UploadAsset,
    description: "The hidden file input that accepts the post images",
    fallbacks: &[
        Locator::Css(FILE_INPUT_SELECTOR),
        Locator::Css(FILE_INPUT_IMAGE_FALLBACK),
    ],
    order: ResolutionOrder::SelectorFirst,
    policy: FailurePolicy::AbortPipeline,
    postcondition: "asset-attached",
};

/// Finds the submit control. Resolver-first on purpose: this is the one
/// step that exercises AI-assisted resolution in the happy path.
pub const SUBMIT_SPEC: StepSpec = StepSpec {
    step: WorkflowStep::ResolveSubmitControl,
    description: "The main submit button that says '发布' or 'Post'",
    fallbacks: &[Locator::Css("button.submit"), Locator::Text(SUBMIT_TEXT)],
    order: ResolutionOrder::ResolverFirst,
    policy: FailurePolicy::AbortPipeline,
    postcondition: "submit-control-resolved",
};

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    Completed,
    SoftFailed(String),
}

/// Whether the platform confirmed the publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Confirmation {
    Confirmed,
    /// The click happened but no success indicator appeared in time.
    /// Unknown-success, not assumed-failure.
    #[default]
    Unknown,
}

/// Record of one publish attempt
#[derive(Debug, Default, Serialize)]
pub struct PublishReport {
    /// Executed steps in order with their outcomes
    pub steps: Vec<(WorkflowStep, StepOutcome)>,
    /// The submit control was clicked
    pub submit_clicked: bool,
    pub confirmation: Confirmation,
}

impl PublishReport {
    fn record(&mut self, step: WorkflowStep, outcome: StepOutcome) {
        self.steps.push((step, outcome));
    }

    /// Outcome for a given step, if it ran
    pub fn outcome(&self, step: WorkflowStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, o)| o)
    }
}

/// Concrete control a step resolved to
#[derive(Debug, Clone)]
enum ResolvedControl {
    Css(String),
    Text(&'static str),
}

/// Sequences one publish attempt against a page
pub struct PublishWorkflow<'a, P: PageDriver> {
    page: &'a P,
    resolver: ElementResolver,
    config: RedpostConfig,
}

impl<'a, P: PageDriver> PublishWorkflow<'a, P> {
    pub fn new(page: &'a P, resolver: ElementResolver, config: RedpostConfig) -> Self {
        Self {
            page,
            resolver,
            config,
        }
    }

    /// Check whether the persisted profile is still logged in.
    ///
    /// Absence of login is a valid, expected outcome: this returns
    /// `Ok(false)`, never an error, for a negative result.
    pub async fn check_login(&self) -> Result<bool> {
        info!("Checking login status at {}", self.config.creator_url);

        if let Err(e) = self.page.navigate(&self.config.creator_url) {
            warn!("Login check navigation failed: {}", e);
            return Ok(false);
        }

        let timeout = Duration::from_secs(self.config.timeouts.login_check_secs);
        let logged_in = self.wait_for_url_fragment(HOME_URL_FRAGMENT, timeout).await;

        if logged_in {
            info!("Login check passed: URL is at creator home");
        } else {
            warn!(
                "Login check failed. Current URL: {}",
                self.page.current_url().unwrap_or_default()
            );
        }
        Ok(logged_in)
    }

    /// Interactive manual login: navigate and wait (generously) for the
    /// operator to scan the QR code.
    pub async fn login(&self) -> Result<()> {
        info!("Navigating to {}", self.config.creator_url);
        self.page.navigate(&self.config.creator_url)?;

        info!("Please scan the QR code to log in. Waiting for login to complete...");
        let timeout = Duration::from_secs(self.config.timeouts.login_secs);

        match self.page.wait_for_text(COMPOSER_TRIGGER_TEXT, timeout) {
            Ok(()) => {
                info!("Login detected: found '{}' trigger", COMPOSER_TRIGGER_TEXT);
                Ok(())
            }
            Err(e) => {
                // The trigger text may be renamed or locale-shifted; a
                // creator URL is still acceptable evidence.
                let url = self.page.current_url().unwrap_or_default();
                if url.contains("creator") {
                    warn!("Trigger text not found, but URL looks correct: {}", url);
                    Ok(())
                } else {
                    Err(RedpostError::Session(format!(
                        "Login timed out or failed: {}",
                        e
                    )))
                }
            }
        }
    }

    /// Run the full publish pipeline for one generated post.
    ///
    /// Fatal step failures abort with [`RedpostError::Step`]; soft
    /// failures are recorded in the report and the pipeline continues.
    pub async fn publish(&self, post: &GeneratedPost, image_path: &Path) -> Result<PublishReport> {
        let mut report = PublishReport::default();

        // CheckLogin. No automatic re-authentication: the interactive
        // login is an operator action, so an expired session aborts here.
        if !self.check_login().await? {
            return Err(RedpostError::step(
                WorkflowStep::CheckLogin.to_string(),
                "not logged in; run `redpost login` first",
            ));
        }
        report.record(WorkflowStep::CheckLogin, StepOutcome::Completed);

        // NavigateHome
        let url = self.page.current_url()?;
        if !url.contains(HOME_URL_FRAGMENT) {
            self.page
                .navigate(&self.config.creator_url)
                .map_err(|e| self.fatal(WorkflowStep::NavigateHome, e))?;
            self.page
                .wait_for_text(COMPOSER_TRIGGER_TEXT, self.navigation_timeout())
                .map_err(|e| self.fatal(WorkflowStep::NavigateHome, e))?;
        }
        report.record(WorkflowStep::NavigateHome, StepOutcome::Completed);

        // OpenComposer
        info!("Opening composer");
        let control = self
            .resolve_control(&OPEN_COMPOSER_SPEC)
            .await
            .map_err(|e| self.fatal(WorkflowStep::OpenComposer, e))?;
        self.click_control(&control)
            .map_err(|e| self.fatal(WorkflowStep::OpenComposer, e))?;
        if !self
            .wait_for_url_fragment(PUBLISH_URL_FRAGMENT, self.navigation_timeout())
            .await
        {
            return Err(RedpostError::step(
                WorkflowStep::OpenComposer.to_string(),
                format!(
                    "composer URL not reached; postcondition '{}' not established",
                    OPEN_COMPOSER_SPEC.postcondition
                ),
            ));
        }
        report.record(WorkflowStep::OpenComposer, StepOutcome::Completed);

        // SelectImagePostTab. The composer defaults to a different content
        // type; failing to find the tab is soft (assume already selected).
        info!("Switching to '{}' tab", IMAGE_TAB_TEXT);
        match self.engage_click(&IMAGE_TAB_SPEC).await {
            Ok(()) => report.record(WorkflowStep::SelectImagePostTab, StepOutcome::Completed),
            Err(e) => {
                warn!("Could not switch composer tab (maybe already there?): {}", e);
                report.record(
                    WorkflowStep::SelectImagePostTab,
                    StepOutcome::SoftFailed(e.to_string()),
                );
            }
        }
        // Let the pane render before touching the file input
        tokio::time::sleep(Duration::from_millis(self.config.timeouts.tab_settle_ms)).await;

        // UploadAsset
        info!("Uploading asset: {}", image_path.display());
        self.upload_asset(image_path)?;
        report.record(WorkflowStep::UploadAsset, StepOutcome::Completed);

        // AwaitEditorReady: the title placeholder is the recovery
        // checkpoint proving the upload was accepted.
        self.page
            .wait_for_css(TITLE_INPUT_SELECTOR, self.editor_timeout())
            .map_err(|_| {
                RedpostError::step(
                    WorkflowStep::AwaitEditorReady.to_string(),
                    "title input did not appear; postcondition 'upload-accepted' not established",
                )
            })?;
        report.record(WorkflowStep::AwaitEditorReady, StepOutcome::Completed);

        // FillTitle
        info!("Filling title: {}", post.title);
        self.page
            .fill_css(TITLE_INPUT_SELECTOR, &post.title)
            .map_err(|e| self.fatal(WorkflowStep::FillTitle, e))?;
        report.record(WorkflowStep::FillTitle, StepOutcome::Completed);

        // FillBody: editor implementation varies, hence the alternation
        info!("Filling content");
        self.page
            .fill_css(BODY_EDITOR_SELECTOR, &post.content)
            .map_err(|e| self.fatal(WorkflowStep::FillBody, e))?;
        report.record(WorkflowStep::FillBody, StepOutcome::Completed);

        // ResolveSubmitControl
        info!("Resolving submit control");
        let submit = self
            .resolve_control(&SUBMIT_SPEC)
            .await
            .map_err(|e| self.fatal(WorkflowStep::ResolveSubmitControl, e))?;
        report.record(WorkflowStep::ResolveSubmitControl, StepOutcome::Completed);

        // Submit
        self.click_control(&submit)
            .map_err(|e| self.fatal(WorkflowStep::Submit, e))?;
        report.submit_clicked = true;
        report.record(WorkflowStep::Submit, StepOutcome::Completed);
        info!("Submit clicked. Waiting for confirmation...");

        // AwaitConfirmation: the click already happened, so a missing
        // toast is unknown-success, never assumed-failure.
        let confirmation_timeout = Duration::from_secs(self.config.timeouts.confirmation_secs);
        match self
            .page
            .wait_for_text(SUCCESS_TOAST_TEXT, confirmation_timeout)
        {
            Ok(()) => {
                info!("Publish successful!");
                report.confirmation = Confirmation::Confirmed;
                report.record(WorkflowStep::AwaitConfirmation, StepOutcome::Completed);
            }
            Err(_) => {
                warn!(
                    "Did not see '{}' message, but submit was clicked. Outcome unknown.",
                    SUCCESS_TOAST_TEXT
                );
                report.confirmation = Confirmation::Unknown;
                report.record(
                    WorkflowStep::AwaitConfirmation,
                    StepOutcome::SoftFailed("success indicator not observed".to_string()),
                );
            }
        }

        Ok(report)
    }

    /// Resolve a step's control per its declared resolution order.
    async fn resolve_control(&self, spec: &StepSpec) -> Result<ResolvedControl> {
        match spec.order {
            ResolutionOrder::ResolverFirst => {
                match self.resolver.resolve(self.page, spec.description).await {
                    Ok(handle) => return Ok(ResolvedControl::Css(handle.selector().to_string())),
                    Err(e) => {
                        warn!(
                            "Resolver failed for '{}', falling back to hardcoded selectors: {}",
                            spec.description, e
                        );
                    }
                }
                self.first_present_fallback(spec)
            }
            ResolutionOrder::SelectorFirst => match self.first_present_fallback(spec) {
                Ok(control) => Ok(control),
                Err(selector_err) => {
                    debug!(
                        "Hardcoded selectors failed for '{}', trying resolver",
                        spec.description
                    );
                    match self.resolver.resolve(self.page, spec.description).await {
                        Ok(handle) => Ok(ResolvedControl::Css(handle.selector().to_string())),
                        Err(resolver_err) => {
                            debug!("Resolver also failed: {}", resolver_err);
                            Err(selector_err)
                        }
                    }
                }
            },
        }
    }

    /// First fallback locator present on the page, in declared order.
    fn first_present_fallback(&self, spec: &StepSpec) -> Result<ResolvedControl> {
        for locator in spec.fallbacks.iter().copied() {
            match locator {
                Locator::Css(selector) => {
                    if self
                        .page
                        .wait_for_css(selector, self.navigation_timeout())
                        .is_ok()
                    {
                        return Ok(ResolvedControl::Css(selector.to_string()));
                    }
                }
                Locator::Text(text) => {
                    if self
                        .page
                        .wait_for_text(text, self.navigation_timeout())
                        .is_ok()
                    {
                        return Ok(ResolvedControl::Text(text));
                    }
                }
            }
        }
        Err(RedpostError::Browser(format!(
            "No fallback locator matched for '{}'",
            spec.description
        )))
    }

    async fn engage_click(&self, spec: &StepSpec) -> Result<()> {
        let control = self.resolve_control(spec).await?;
        self.click_control(&control)
    }

    fn click_control(&self, control: &ResolvedControl) -> Result<()> {
        match control {
            ResolvedControl::Css(selector) => self.page.click_css(selector),
            ResolvedControl::Text(text) => self.page.click_text(text),
        }
    }

    /// One explicit fallback: generic file input, then the image-typed one.
    fn upload_asset(&self, image_path: &Path) -> Result<()> {
        let mut last_err: Option<RedpostError> = None;

        for locator in UPLOAD_SPEC.fallbacks.iter().copied() {
            if let Locator::Css(selector) = locator {
                match self.page.set_file_input(selector, image_path) {
                    Ok(()) => {
                        info!("Asset attached via {}", selector);
                        return Ok(());
                    }
                    Err(e) => {
                        warn!("Upload failed with selector {}: {}", selector, e);
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(RedpostError::step(
            WorkflowStep::UploadAsset.to_string(),
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no file input found".to_string()),
        ))
    }

    async fn wait_for_url_fragment(&self, fragment: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self
                .page
                .current_url()
                .map(|url| url.contains(fragment))
                .unwrap_or(false)
            {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(URL_POLL_INTERVAL_MS)).await;
        }
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeouts.navigation_secs)
    }

    fn editor_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeouts.editor_secs)
    }

    fn fatal(&self, step: WorkflowStep, err: RedpostError) -> RedpostError {
        RedpostError::step(step.to_string(), err.to_string())
    }
}
