//! Justification fallback.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use bidwise_core::constants::{MIN_EXECUTIVE_SUMMARY_LEN, MIN_JUSTIFICATION_LEN};
use bidwise_core::errors::JustificationError;
use bidwise_core::traits::{Justification, JustificationRequest, JustificationWriter};

/// Deterministic template built from the compliance summary. Its output
/// always satisfies the length invariants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateJustifier;

impl TemplateJustifier {
    pub fn render(request: &JustificationRequest<'_>) -> Justification {
        let s = request.summary;
        let c = &s.counts;
        let mut justification = format!(
            "Recommendation: {} with confidence {}/100. Evaluated {} requirement(s): \
             {} compliant, {} partial, {} warning, {} non-compliant, {} unknown. ",
            request.decision,
            request.confidence_score,
            s.total_evaluated,
            c.compliant,
            c.partial,
            c.warning,
            c.non_compliant,
            c.unknown,
        );
        justification.push_str(match (s.mandatory_met, s.mandatory_unknown) {
            (false, _) => "At least one mandatory requirement is not met. ",
            (true, true) => "Some mandatory requirements could not be verified. ",
            (true, false) => "No mandatory requirement is failed. ",
        });
        match request.risks.first() {
            Some(worst) => justification.push_str(&format!(
                "{} risk(s) identified; most severe ({}): {}.",
                request.risks.len(),
                worst.severity.as_str(),
                worst.description
            )),
            None => justification.push_str("No risks identified."),
        }
        if !request.review_reasons.is_empty() {
            justification.push_str(&format!(
                " Human review required: {}.",
                request.review_reasons.join("; ")
            ));
        }

        let executive_summary = format!(
            "{}: {} overall compliance, confidence {}/100",
            request.decision, s.overall_compliance, request.confidence_score
        );

        Justification {
            justification,
            executive_summary,
        }
    }
}

impl JustificationWriter for TemplateJustifier {
    fn write(&self, request: &JustificationRequest<'_>) -> Result<Justification, JustificationError> {
        Ok(Self::render(request))
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Ask `writer` for text, falling back to the template when it fails, panics,
/// runs past `timeout`, or returns text that is too short. The error, if any,
/// is returned beside the text so callers can flag it.
///
/// The writer runs on its own thread over an owned copy of the request. A
/// writer that times out is abandoned; its late answer is dropped.
pub fn justify(
    writer: &Arc<dyn JustificationWriter>,
    request: &JustificationRequest<'_>,
    timeout: Duration,
) -> (Justification, Option<JustificationError>) {
    let error = match run_writer(writer, request, timeout) {
        Ok(text) => match check_lengths(writer.name(), &text) {
            Ok(()) => return (text, None),
            Err(e) => e,
        },
        Err(e) => e,
    };
    tracing::warn!(
        writer = writer.name(),
        error = %error,
        "justification writer failed, using template"
    );
    (TemplateJustifier::render(request), Some(error))
}

fn run_writer(
    writer: &Arc<dyn JustificationWriter>,
    request: &JustificationRequest<'_>,
    timeout: Duration,
) -> Result<Justification, JustificationError> {
    let name = writer.name().to_string();
    let worker = Arc::clone(writer);
    let decision = request.decision;
    let confidence_score = request.confidence_score;
    let summary = request.summary.clone();
    let risks = request.risks.to_vec();
    let review_reasons = request.review_reasons.to_vec();
    let (tx, rx) = crossbeam_channel::bounded(1);

    std::thread::Builder::new()
        .name("bidwise-justify".to_string())
        .spawn(move || {
            let request = JustificationRequest {
                decision,
                confidence_score,
                summary: &summary,
                risks: &risks,
                review_reasons: &review_reasons,
            };
            let _ = tx.send(worker.write(&request));
        })
        .map_err(|e| JustificationError::Unavailable {
            writer: name.clone(),
            message: format!("could not spawn writer thread: {e}"),
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(JustificationError::TimedOut {
            writer: name,
            timeout_ms: timeout.as_millis() as u64,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(JustificationError::Panicked { writer: name }),
    }
}

fn check_lengths(writer: &str, text: &Justification) -> Result<(), JustificationError> {
    let j = text.justification.trim().chars().count();
    if j < MIN_JUSTIFICATION_LEN {
        return Err(JustificationError::InvalidOutput {
            writer: writer.to_string(),
            message: format!("justification has {j} chars, minimum {MIN_JUSTIFICATION_LEN}"),
        });
    }
    let e = text.executive_summary.trim().chars().count();
    if e < MIN_EXECUTIVE_SUMMARY_LEN {
        return Err(JustificationError::InvalidOutput {
            writer: writer.to_string(),
            message: format!(
                "executive summary has {e} chars, minimum {MIN_EXECUTIVE_SUMMARY_LEN}"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidwise_core::models::{ComplianceSummary, Decision};

    struct ShortWriter;

    impl JustificationWriter for ShortWriter {
        fn write(&self, _: &JustificationRequest<'_>) -> Result<Justification, JustificationError> {
            Ok(Justification {
                justification: "Bid.".into(),
                executive_summary: "Bid.".into(),
            })
        }

        fn name(&self) -> &str {
            "short"
        }
    }

    struct SlowWriter;

    impl JustificationWriter for SlowWriter {
        fn write(&self, request: &JustificationRequest<'_>) -> Result<Justification, JustificationError> {
            std::thread::sleep(Duration::from_millis(500));
            TemplateJustifier.write(request)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct PanickingWriter;

    impl JustificationWriter for PanickingWriter {
        fn write(&self, _: &JustificationRequest<'_>) -> Result<Justification, JustificationError> {
            panic!("writer crashed");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn request(summary: &ComplianceSummary) -> JustificationRequest<'_> {
        JustificationRequest {
            decision: Decision::NoBid,
            confidence_score: 0,
            summary,
            risks: &[],
            review_reasons: &[],
        }
    }

    #[test]
    fn template_meets_length_invariants_even_when_empty() {
        let summary = ComplianceSummary::empty();
        let text = TemplateJustifier::render(&request(&summary));
        assert!(check_lengths("template", &text).is_ok());
    }

    #[test]
    fn short_writer_output_falls_back() {
        let summary = ComplianceSummary::empty();
        let writer: Arc<dyn JustificationWriter> = Arc::new(ShortWriter);
        let (text, err) = justify(&writer, &request(&summary), Duration::from_secs(2));
        assert!(matches!(err, Some(JustificationError::InvalidOutput { .. })));
        assert!(text.justification.starts_with("Recommendation: NO_BID"));
    }

    #[test]
    fn slow_writer_times_out_to_template() {
        let summary = ComplianceSummary::empty();
        let writer: Arc<dyn JustificationWriter> = Arc::new(SlowWriter);
        let (text, err) = justify(&writer, &request(&summary), Duration::from_millis(20));
        assert_eq!(
            err.map(|e| e.to_string()),
            Some("Writer slow timed out after 20ms".to_string())
        );
        assert_eq!(text, TemplateJustifier::render(&request(&summary)));
    }

    #[test]
    fn panicking_writer_falls_back() {
        let summary = ComplianceSummary::empty();
        let writer: Arc<dyn JustificationWriter> = Arc::new(PanickingWriter);
        let (text, err) = justify(&writer, &request(&summary), Duration::from_secs(2));
        assert!(matches!(err, Some(JustificationError::Panicked { .. })));
        assert!(check_lengths("template", &text).is_ok());
    }

    #[test]
    fn good_writer_output_is_kept() {
        let summary = ComplianceSummary::empty();
        let writer: Arc<dyn JustificationWriter> = Arc::new(TemplateJustifier);
        let (text, err) = justify(&writer, &request(&summary), Duration::from_secs(2));
        assert!(err.is_none());
        assert_eq!(text, TemplateJustifier::render(&request(&summary)));
    }
}
