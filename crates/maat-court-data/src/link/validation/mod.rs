mod rules;

use tracing::debug;

use crate::domain::messages::LinkRequest;
use crate::domain::{
    CommonPlatformData, CourtDataError, CrownCourtCode, DefendantMaatData, MaatId, RepOrder,
    SolicitorMaatData,
};
use crate::store::CourtDataRepository;

/// Everything the link writer needs, gathered while the rules ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLink<'r> {
    pub request: &'r LinkRequest,
    pub maat_id: MaatId,
    pub case_urn: String,
    pub rep_order: RepOrder,
    pub common_platform: CommonPlatformData,
    pub court_code: Option<CrownCourtCode>,
    pub solicitor: Option<SolicitorMaatData>,
    pub defendant: DefendantMaatData,
}

/// Runs the link rules in order, stopping at the first failure.
pub fn validate_link<'r>(
    repo: &dyn CourtDataRepository,
    request: &'r LinkRequest,
) -> Result<ValidatedLink<'r>, CourtDataError> {
    let mut scope = ValidationScope::new(repo, request);

    for (rule_name, rule) in rules::LINK_RULES {
        if let Err(error) = rule(&mut scope) {
            debug!(
                rule = rule_name,
                maat_id = ?request.maat_id,
                code = error.code(),
                "link validation failed"
            );
            return Err(error);
        }
    }

    scope.finish()
}

/// Accumulates lookups as the rules run so later rules and the writer reuse them.
pub(crate) struct ValidationScope<'a, 'r> {
    repo: &'a dyn CourtDataRepository,
    request: &'r LinkRequest,
    maat_id: Option<MaatId>,
    rep_order: Option<RepOrder>,
    common_platform: Option<CommonPlatformData>,
    case_urn: Option<String>,
    court_code: Option<CrownCourtCode>,
    solicitor: Option<SolicitorMaatData>,
    defendant: Option<DefendantMaatData>,
}

impl<'a, 'r> ValidationScope<'a, 'r> {
    fn new(repo: &'a dyn CourtDataRepository, request: &'r LinkRequest) -> Self {
        Self {
            repo,
            request,
            maat_id: None,
            rep_order: None,
            common_platform: None,
            case_urn: None,
            court_code: None,
            solicitor: None,
            defendant: None,
        }
    }

    fn maat_id(&self) -> Result<MaatId, CourtDataError> {
        self.maat_id.ok_or_else(out_of_order)
    }

    fn finish(self) -> Result<ValidatedLink<'r>, CourtDataError> {
        Ok(ValidatedLink {
            request: self.request,
            maat_id: self.maat_id.ok_or_else(out_of_order)?,
            case_urn: self.case_urn.ok_or_else(out_of_order)?,
            rep_order: self.rep_order.ok_or_else(out_of_order)?,
            common_platform: self.common_platform.ok_or_else(out_of_order)?,
            court_code: self.court_code,
            solicitor: self.solicitor,
            defendant: self.defendant.ok_or_else(out_of_order)?,
        })
    }
}

// Reached only if the rule table is reordered so a rule reads a value no earlier rule set.
fn out_of_order() -> CourtDataError {
    tracing::error!("link rule read a value before the rule that sets it ran");
    CourtDataError::System {
        operation: "link validation",
    }
}
