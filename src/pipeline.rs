//! Pipeline – ties the chrome, the cursor and one report assembler together
//! and renders the result.
//!
//! Every generation call creates a fresh surface; nothing but the brand logo
//! cache is shared between calls.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::chrome::{Chrome, ChromeSpec, Generator};
use crate::config::{Orientation, PageGeometry, ReportConfig};
use crate::cursor::{Continuation, Cursor};
use crate::display_list::DocumentLayout;
use crate::error::{ReportError, Result};
use crate::image_fetch::{EncodedImage, ImageSource, LogoCache, BRAND_LOGO};
use crate::output;
use crate::render::render_pdf;
use crate::surface::Surface;

/// Everything a report needs besides its own records.
pub struct ReportContext<'a> {
    pub config: ReportConfig,
    pub generator: Generator,
    pub generated_at: NaiveDateTime,
    pub images: &'a dyn ImageSource,
    pub logo_cache: &'a LogoCache,
}

impl<'a> ReportContext<'a> {
    /// Context stamped with the current local time, using the process-wide
    /// logo cache.
    pub fn new(config: ReportConfig, generator: Generator, images: &'a dyn ImageSource) -> Self {
        Self {
            config,
            generator,
            generated_at: Local::now().naive_local(),
            images,
            logo_cache: &BRAND_LOGO,
        }
    }

    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }

    pub fn with_logo_cache(mut self, cache: &'a LogoCache) -> Self {
        self.logo_cache = cache;
        self
    }

    /// The brand logo, fetched on first use.
    pub fn logo(&self) -> Option<EncodedImage> {
        self.logo_cache
            .ensure_loaded(self.images, self.config.logo_url.as_deref())
            .cloned()
    }
}

/// One document type. Implementors provide the hooks they need; the shared
/// header, continuation chrome and footer wiring lives in [`compose`].
pub trait ReportAssembler {
    /// Title shown in the header and embedded in the PDF metadata.
    fn title(&self, ctx: &ReportContext) -> String;

    fn subtitle(&self, _ctx: &ReportContext) -> Option<String> {
        None
    }

    /// Overrides the configured orientation.
    fn orientation(&self) -> Option<Orientation> {
        None
    }

    /// Whether pages carry the branded header and footer.
    fn uses_chrome(&self) -> bool {
        true
    }

    /// Reject input that would produce corrupted layout.
    fn validate(&self, _ctx: &ReportContext, _page: &PageGeometry) -> Result<()> {
        Ok(())
    }

    /// Draw a cover on the first page. Returns `false` when there is none.
    /// Covers are exempt from the footer.
    fn compose_cover(&self, _surface: &mut Surface, _chrome: &Chrome, _ctx: &ReportContext) -> bool {
        false
    }

    fn compose_body(&self, cursor: &mut Cursor, chrome: &Chrome, ctx: &ReportContext) -> Result<()>;

    /// Default file name for the saved document.
    fn file_name(&self) -> String;
}

/// Fail fast when a label column leaves no room for its values.
pub fn ensure_label_width(label_width: f32, content_width: f32) -> Result<()> {
    if label_width >= content_width {
        return Err(ReportError::InvalidLayout(format!(
            "label column {label_width:.1}mm is not narrower than content width {content_width:.1}mm"
        )));
    }
    Ok(())
}

/// Build the display list for one document.
pub fn compose(assembler: &dyn ReportAssembler, ctx: &ReportContext) -> Result<DocumentLayout> {
    ctx.config.validate()?;
    let geometry = PageGeometry {
        orientation: assembler
            .orientation()
            .unwrap_or(ctx.config.page.orientation),
        ..ctx.config.page
    };
    assembler.validate(ctx, &geometry)?;

    let title = assembler.title(ctx);
    let uses_chrome = assembler.uses_chrome();
    let logo = if uses_chrome { ctx.logo() } else { None };
    let chrome = Chrome::new(
        ChromeSpec {
            title: title.clone(),
            subtitle: assembler.subtitle(ctx),
            generator: ctx.generator.clone(),
            generated_at: ctx.generated_at,
        },
        ctx.config.clone(),
        logo,
    );

    let mut surface = Surface::new(&title, geometry);
    let has_cover = assembler.compose_cover(&mut surface, &chrome, ctx);
    if has_cover {
        surface.add_page();
    }

    let (start_y, continuation) = if uses_chrome {
        // pages after a cover only get the compact header
        let y = chrome.draw_header(&mut surface, has_cover);
        (y, Continuation::CompactChrome(chrome.clone()))
    } else {
        (geometry.margins.top, Continuation::Plain)
    };

    let mut cursor = Cursor::new(surface, continuation, start_y);
    assembler.compose_body(&mut cursor, &chrome, ctx)?;
    let mut surface = cursor.into_surface();

    if uses_chrome {
        chrome.draw_footer(&mut surface, usize::from(has_cover));
    }

    log::info!("composed \"{}\": {} page(s)", title, surface.page_count());
    Ok(surface.into_layout())
}

/// Full pipeline: records → PDF bytes.
///
/// Returns `(pdf_bytes, layout)`.
pub fn generate(assembler: &dyn ReportAssembler, ctx: &ReportContext) -> Result<(Vec<u8>, DocumentLayout)> {
    let layout = compose(assembler, ctx)?;
    let bytes = render_pdf(&layout)?;
    Ok((bytes, layout))
}

/// Generate and save under the assembler's default file name in `dir`.
pub fn generate_to(assembler: &dyn ReportAssembler, ctx: &ReportContext, dir: &Path) -> Result<PathBuf> {
    let (bytes, _) = generate(assembler, ctx)?;
    output::save(dir, &assembler.file_name(), &bytes)
}
