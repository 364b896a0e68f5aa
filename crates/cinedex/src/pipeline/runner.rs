use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::{debug, info_span, warn};

use crate::config::CrawlConfig;
use crate::record::RecordStore;
use crate::session::Browser;
use crate::site::SiteExtractor;
use crate::storage::Library;
use crate::translate::Translator;
use crate::worker::job::JobResult;

use super::context::JobContext;
use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter, Stage};

/// Result of a background relocation, reported over a channel so the
/// scheduler can account for moves that finish after the job itself.
#[derive(Debug)]
pub struct RelocationOutcome {
    pub job_id: String,
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    pub error: Option<String>,
}

impl RelocationOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

pub struct Pipeline {
    home_settle: Duration,
    page_settle: Duration,
    retry_backoff: Duration,
    max_cover_attempts: u32,
    library: Library,
    extractor: Arc<dyn SiteExtractor>,
    translator: Arc<dyn Translator>,
    relocation_tx: Sender<RelocationOutcome>,
}

impl Pipeline {
    pub fn new(
        crawl: &CrawlConfig,
        library: Library,
        extractor: Arc<dyn SiteExtractor>,
        translator: Arc<dyn Translator>,
        relocation_tx: Sender<RelocationOutcome>,
    ) -> Self {
        Pipeline {
            home_settle: Duration::from_secs(crawl.home_settle_secs),
            page_settle: Duration::from_secs(crawl.page_settle_secs),
            retry_backoff: Duration::from_secs(crawl.retry_backoff_secs),
            max_cover_attempts: crawl.max_cover_attempts,
            library,
            extractor,
            translator,
            relocation_tx,
        }
    }

    /// Run the full crawl for a single video file.
    /// Returns a (JobResult, JobContext) pair.
    pub fn run(
        &self,
        mut ctx: JobContext,
        session: &mut dyn Browser,
        progress: &dyn ProgressReporter,
    ) -> (JobResult, JobContext) {
        let _crawl_span = info_span!("crawl",
            job_id = %ctx.job.id,
            title = %ctx.job.derived_title,
        )
        .entered();

        // Stage 1: Make sure the session sits on the site home page
        {
            let _stage = info_span!("navigate").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::Navigate,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_navigate(session) {
                return self.abort(ctx, Stage::Navigate, e, progress);
            }
        }

        // Stage 2: Submit the search
        {
            let _stage = info_span!("search").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::Search,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_search(&ctx, session) {
                return self.abort(ctx, Stage::Search, e, progress);
            }
        }

        // Stage 3: Open the top result
        {
            let _stage = info_span!("open_result").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::OpenResult,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_open_result(session) {
                return self.abort(ctx, Stage::OpenResult, e, progress);
            }
        }

        // Stage 4: Read metadata off the movie page, create folder and record
        {
            let _stage = info_span!("extract").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::Extract,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_extract(&mut ctx, session) {
                return self.abort(ctx, Stage::Extract, e, progress);
            }
        }

        // Stage 5: Translate name and genres
        {
            let _stage = info_span!("translate").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::Translate,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_translate(&mut ctx) {
                return self.abort(ctx, Stage::Translate, e, progress);
            }
        }

        // Stage 6: Write all fields through to the record
        {
            let _stage = info_span!("persist").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::Persist,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_persist(&mut ctx) {
                return self.abort(ctx, Stage::Persist, e, progress);
            }
        }

        // Stage 7: Download the cover, retrying recoverable failures
        {
            let _stage = info_span!("fetch_cover").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::FetchCover,
                title: ctx.title().to_string(),
            });
            if let Err(e) = self.stage_fetch_cover(&mut ctx, session) {
                return self.abort(ctx, Stage::FetchCover, e, progress);
            }
        }

        // Stage 8: Move the video into its folder in the background
        {
            let _stage = info_span!("relocate").entered();
            progress.report(ProgressEvent::Stage {
                stage: Stage::Relocate,
                title: ctx.title().to_string(),
            });
            self.stage_relocate(&ctx);
        }

        let movie_dir = ctx.movie_dir.clone().expect("extract stage completed");
        progress.report(ProgressEvent::Completed {
            title: ctx.title().to_string(),
            movie_dir,
        });

        let result = JobResult::success(&ctx.job, ctx.title());
        (result, ctx)
    }

    fn stage_navigate(&self, session: &mut dyn Browser) -> Result<(), PipelineError> {
        let home = self.extractor.home_url();
        let current = session.current_url()?;
        if current.trim_end_matches('/') != home.trim_end_matches('/') {
            session.open(home, self.home_settle)?;
        } else {
            debug!("already on {home}, skipping navigation");
        }
        Ok(())
    }

    fn stage_search(&self, ctx: &JobContext, session: &mut dyn Browser) -> Result<(), PipelineError> {
        self.extractor
            .submit_search(session, &ctx.job.derived_title)?;
        Ok(())
    }

    fn stage_open_result(&self, session: &mut dyn Browser) -> Result<(), PipelineError> {
        let url = self.extractor.first_result_url(session)?;
        session.open(&url, self.page_settle)?;
        Ok(())
    }

    fn stage_extract(
        &self,
        ctx: &mut JobContext,
        session: &mut dyn Browser,
    ) -> Result<(), PipelineError> {
        let name = self.extractor.movie_name(session)?;
        let movie_dir = self.library.ensure_movie_dir(&name)?;
        let record = RecordStore::create(Library::record_path(&movie_dir))?;

        ctx.genres = self.extractor.genres(session)?;
        ctx.rating = Some(self.extractor.rating(session)?);
        ctx.year = Some(self.extractor.year(session)?);

        ctx.resolved_name = Some(name);
        ctx.movie_dir = Some(movie_dir);
        ctx.record = Some(record);
        Ok(())
    }

    fn stage_translate(&self, ctx: &mut JobContext) -> Result<(), PipelineError> {
        let name = ctx.resolved_name.as_ref().expect("extract stage completed");
        ctx.name_translated = Some(self.translator.translate(name)?);

        let mut translated = Vec::with_capacity(ctx.genres.len());
        for genre in &ctx.genres {
            translated.push(self.translator.translate(genre)?);
        }
        ctx.genres_translated = translated;
        Ok(())
    }

    fn stage_persist(&self, ctx: &mut JobContext) -> Result<(), PipelineError> {
        let name = ctx.resolved_name.clone().expect("extract stage completed");
        let movie_dir = ctx.movie_dir.clone().expect("extract stage completed");
        let record = ctx.record.as_mut().expect("extract stage completed");

        record.set_name(name)?;
        if let Some(translated) = ctx.name_translated.clone() {
            record.set_name_translated(translated)?;
        }
        record.set_genres(ctx.genres.clone())?;
        record.set_genres_translated(ctx.genres_translated.clone())?;
        if let Some(rating) = ctx.rating {
            record.set_rating(rating)?;
        }
        if let Some(year) = ctx.year {
            record.set_year(year)?;
        }

        // The cover path goes into the record before the download runs, so
        // a crash mid-download still leaves the record pointing at it.
        let cover_dest = Library::cover_path(&movie_dir);
        record.set_cover_path(cover_dest.to_string_lossy().into_owned())?;
        ctx.cover_dest = Some(cover_dest);
        Ok(())
    }

    fn stage_fetch_cover(
        &self,
        ctx: &mut JobContext,
        session: &mut dyn Browser,
    ) -> Result<(), PipelineError> {
        let url = self.extractor.cover_image_url(session)?;
        let dest = ctx.cover_dest.clone().expect("persist stage completed");

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if session.download(&url, &dest)? {
                break;
            }
            if self.max_cover_attempts > 0 && attempts >= self.max_cover_attempts {
                return Err(PipelineError::CoverRetriesExhausted { url, attempts });
            }
            warn!(
                "cover download attempt {attempts} failed, retrying in {:?}",
                self.retry_backoff
            );
            thread::sleep(self.retry_backoff);
        }

        let record = ctx.record.as_ref().expect("extract stage completed");
        record.flush()?;
        Ok(())
    }

    fn stage_relocate(&self, ctx: &JobContext) {
        let library = self.library.clone();
        let source = ctx.job.source_path.clone();
        let movie_dir = ctx.movie_dir.clone().expect("extract stage completed");
        let job_id = ctx.job.id.clone();
        let outcome_tx = self.relocation_tx.clone();

        thread::spawn(move || {
            let outcome = match library.relocate(&source, &movie_dir) {
                Ok(target) => RelocationOutcome {
                    job_id,
                    source,
                    target: Some(target),
                    error: None,
                },
                Err(err) => {
                    warn!("relocation of {} failed: {err}", source.display());
                    RelocationOutcome {
                        job_id,
                        source,
                        target: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            let _ = outcome_tx.send(outcome);
        });
    }

    fn abort(
        &self,
        mut ctx: JobContext,
        stage: Stage,
        err: PipelineError,
        progress: &dyn ProgressReporter,
    ) -> (JobResult, JobContext) {
        if err.poisons_session() {
            ctx.session_poisoned = true;
        }
        let message = err.to_string();
        progress.report(ProgressEvent::Failed {
            stage,
            error: message.clone(),
        });
        let result = JobResult::failure(&ctx.job, ctx.title(), message);
        (result, ctx)
    }
}
