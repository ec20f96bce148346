use super::ValidationScope;
use crate::domain::messages::non_blank;
use crate::domain::{
    ConflictError, CourtDataError, FatalLookupError, MaatId, NotFoundError, ValidationError,
};

pub(super) type Rule = fn(&mut ValidationScope<'_, '_>) -> Result<(), CourtDataError>;

/// Link rules in evaluation order. The first failure wins.
pub(super) const LINK_RULES: [(&str, Rule); 8] = [
    ("maat_id", maat_id_is_valid),
    ("common_platform_data", common_platform_data_exists),
    ("case_urn_present", case_urn_is_present),
    ("not_already_linked", not_already_linked),
    ("case_urn_matches", case_urn_matches),
    ("court_location", court_location_resolves),
    ("solicitor", solicitor_lookup),
    ("defendant", defendant_exists),
];

fn maat_id_is_valid(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let raw = scope.request.maat_id;
    let maat_id = match raw {
        Some(id) if id > 0 => MaatId(id),
        _ => return Err(ValidationError::InvalidMaatId(raw).into()),
    };

    let rep_order = scope
        .repo
        .find_rep_order(maat_id)?
        .ok_or(ValidationError::InvalidMaatId(raw))?;

    scope.maat_id = Some(maat_id);
    scope.rep_order = Some(rep_order);
    Ok(())
}

fn common_platform_data_exists(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let maat_id = scope.maat_id()?;
    let data = scope
        .repo
        .find_common_platform_data(maat_id)?
        .ok_or(NotFoundError::MissingCommonPlatformData(maat_id))?;
    scope.common_platform = Some(data);
    Ok(())
}

fn case_urn_is_present(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let case_urn =
        non_blank(scope.request.case_urn.as_deref()).ok_or(ValidationError::MissingCaseUrn)?;
    scope.case_urn = Some(case_urn.to_string());
    Ok(())
}

fn not_already_linked(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let maat_id = scope.maat_id()?;
    match scope.repo.find_active_link(maat_id)? {
        Some(_) => Err(ConflictError::AlreadyLinked(maat_id).into()),
        None => Ok(()),
    }
}

fn case_urn_matches(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let maat_id = scope.maat_id()?;
    let on_application = scope
        .common_platform
        .as_ref()
        .and_then(|data| non_blank(data.case_urn.as_deref()))
        .ok_or(ValidationError::CaseUrnNotEntered(maat_id))?;

    match scope.case_urn.as_deref() {
        Some(on_request) if on_request.eq_ignore_ascii_case(on_application) => Ok(()),
        _ => Err(ValidationError::CaseUrnMismatch.into()),
    }
}

fn court_location_resolves(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let Some(location) = non_blank(scope.request.cjs_location.as_deref()) else {
        return Ok(());
    };

    let code = scope
        .repo
        .find_crown_court_code(location)?
        .ok_or_else(|| FatalLookupError::UnknownCourtCode(location.to_string()))?;
    scope.court_code = Some(code);
    Ok(())
}

fn solicitor_lookup(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let maat_id = scope.maat_id()?;
    scope.solicitor = scope.repo.find_solicitor_maat_data(maat_id)?;
    Ok(())
}

fn defendant_exists(scope: &mut ValidationScope<'_, '_>) -> Result<(), CourtDataError> {
    let maat_id = scope.maat_id()?;
    let defendant = scope
        .repo
        .find_defendant_maat_data(maat_id)?
        .ok_or(NotFoundError::MissingDefendantRecord(maat_id))?;
    scope.defendant = Some(defendant);
    Ok(())
}
