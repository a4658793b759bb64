//! Upload panel: drop zone plus the selected file's status card.

use crate::ui::components::{Icon, card};
use crate::upload::{PDF_MIME, PROGRESS_DONE, UploadState};

/// DOM id of the upload panel.
pub const UPLOAD_ID: &str = "upload-panel";

/// Human-readable size: `B` below 1 KiB, then `KB` and `MB` with one decimal.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

fn render_drop_zone(is_dragging: bool, max_file_size: usize) -> String {
    let (class, prompt) = if is_dragging {
        ("drop-zone dragging", "Drop your PDF here")
    } else {
        ("drop-zone", "Drop PDF or click to upload")
    };
    format!(
        r#"<div id="drop-zone" class="{class}" role="button" tabindex="0"><input id="file-input" type="file" accept="{PDF_MIME}" class="hidden">{icon}<p class="drop-prompt">{prompt}</p><p class="drop-hint">Maximum file size: {limit}</p></div>"#,
        icon = Icon::Upload.render("icon-lg text-primary"),
        limit = format_file_size(max_file_size as u64),
    )
}

fn render_file_status(state: &UploadState) -> String {
    let Some(file) = state.selected_file() else {
        return String::new();
    };
    let progress = state.progress();
    let done = progress >= PROGRESS_DONE;
    let status_icon = if done {
        Icon::Check.render("text-success")
    } else {
        Icon::Loader.render("text-primary")
    };
    let ready = if done {
        format!(
            r#"<p class="ready">{}Ready to answer your questions!</p>"#,
            Icon::Sparkles.render("icon-sm")
        )
    } else {
        String::new()
    };

    card(
        "file-status",
        &format!(
            r#"<div class="file-row"><div><p class="file-name">{name}</p><p class="file-size">{size}</p></div>{status_icon}</div><div class="progress" role="progressbar" aria-valuemin="0" aria-valuemax="100" aria-valuenow="{progress}"><div class="progress-bar" style="width: {progress}%"></div></div>{ready}"#,
            name = html_escape::encode_text(file.name()),
            size = format_file_size(file.size()),
        ),
    )
}

/// Render the whole upload panel for one snapshot.
#[must_use]
pub fn render_upload_panel(state: &UploadState, max_file_size: usize) -> String {
    format!(
        r#"<div id="{UPLOAD_ID}" class="upload-panel" data-revision="{revision}">{zone}{status}</div>"#,
        revision = state.revision(),
        zone = render_drop_zone(state.is_dragging(), max_file_size),
        status = render_file_status(state),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_file_size(52_428_800), "50.0 MB");
    }

    #[test]
    fn test_empty_panel() {
        let html = render_upload_panel(&UploadState::default(), 52_428_800);
        assert!(html.contains("Drop PDF or click to upload"));
        assert!(html.contains("Maximum file size: 50.0 MB"));
        assert!(!html.contains("progressbar"));
    }

    #[test]
    fn test_size_hint_follows_limit() {
        let html = render_upload_panel(&UploadState::default(), 5 * 1024 * 1024);
        assert!(html.contains("Maximum file size: 5.0 MB"));
        assert!(!html.contains("50.0 MB"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_card_tracks_progress() {
        use crate::config::UploadConfig;
        use crate::scheduler::TaskScope;
        use crate::upload::{CandidateFile, DisabledSink, UploadControl};
        use axum::body::Bytes;
        use std::sync::Arc;
        use std::time::Duration;

        let scope = TaskScope::new();
        let control = UploadControl::new(
            UploadConfig::default(),
            Arc::new(DisabledSink),
            &scope,
            Arc::new(|_: &crate::upload::FileDescriptor| {}),
        );
        let bytes = Bytes::from(vec![0_u8; 2 * 1024 * 1024]);
        control.drop_files(vec![CandidateFile::new("report.pdf", Some(PDF_MIME), bytes)]);

        let loading = render_upload_panel(&control.snapshot(), control.max_file_size());
        assert!(loading.contains("report.pdf"));
        assert!(loading.contains("2.0 MB"));
        assert!(loading.contains("animate-spin"));
        assert!(!loading.contains("Ready to answer your questions!"));

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let done = render_upload_panel(&control.snapshot(), control.max_file_size());
        assert!(done.contains(r#"style="width: 100%""#));
        assert!(done.contains("Ready to answer your questions!"));
        assert!(!done.contains("animate-spin"));
    }
}
