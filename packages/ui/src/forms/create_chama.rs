//! The chama creation wizard.
//!
//! The draft is collected over four steps. Only the first two carry field rules; the
//! wizard will not move past a step, or jump ahead of one, until it validates.

use api::models::{ChamaType, ContributionFrequency, NewChama};

use super::contribution::{parse_amount, whole_shillings};
use super::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    BasicInformation,
    FinancialSettings,
    GroupSettings,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        Self::BasicInformation,
        Self::FinancialSettings,
        Self::GroupSettings,
        Self::Review,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::BasicInformation => "Basic Information",
            Self::FinancialSettings => "Financial Settings",
            Self::GroupSettings => "Group Settings",
            Self::Review => "Review & Create",
        }
    }

    /// 1-based, as shown in the step indicator.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    fn next(self) -> Option<Self> {
        Self::ALL.get(self as usize + 1).copied()
    }

    fn prev(self) -> Option<Self> {
        (self as usize).checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Frequencies offered when creating a chama.
pub const FREQUENCIES: [ContributionFrequency; 4] = [
    ContributionFrequency::Weekly,
    ContributionFrequency::Biweekly,
    ContributionFrequency::Monthly,
    ContributionFrequency::Quarterly,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChamaField {
    Name,
    Description,
    ContributionAmount,
    MaxMembers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChamaDraft {
    pub name: String,
    pub description: String,
    pub contribution_amount: String,
    pub contribution_frequency: ContributionFrequency,
    pub chama_type: ChamaType,
    pub max_members: String,
    pub is_public: bool,
    pub require_approval: bool,
    pub enable_ai: bool,
}

impl Default for ChamaDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            contribution_amount: String::new(),
            contribution_frequency: ContributionFrequency::Monthly,
            chama_type: ChamaType::Savings,
            max_members: "20".to_string(),
            is_public: true,
            require_approval: true,
            enable_ai: true,
        }
    }
}

impl ChamaDraft {
    fn amount(&self) -> Option<f64> {
        parse_amount(&self.contribution_amount)
    }

    fn members(&self) -> Option<u64> {
        self.max_members.trim().parse().ok()
    }

    pub fn validate_step(&self, step: WizardStep) -> FieldErrors<ChamaField> {
        let mut errors = FieldErrors::default();
        match step {
            WizardStep::BasicInformation => {
                let name = self.name.trim();
                if name.is_empty() {
                    errors.set(ChamaField::Name, "Chama name is required");
                } else if name.chars().count() < 3 {
                    errors.set(ChamaField::Name, "Name must be at least 3 characters");
                }

                let description = self.description.trim();
                if description.is_empty() {
                    errors.set(ChamaField::Description, "Description is required");
                } else if description.chars().count() < 10 {
                    errors.set(
                        ChamaField::Description,
                        "Description must be at least 10 characters",
                    );
                }
            }
            WizardStep::FinancialSettings => {
                match self.amount() {
                    None => errors.set(
                        ChamaField::ContributionAmount,
                        "Valid contribution amount is required",
                    ),
                    Some(a) if a < 100.0 => {
                        errors.set(ChamaField::ContributionAmount, "Minimum contribution is KES 100")
                    }
                    Some(a) if a > 1_000_000.0 => errors.set(
                        ChamaField::ContributionAmount,
                        "Maximum contribution is KES 1,000,000",
                    ),
                    Some(_) => {}
                }

                match self.members() {
                    None => errors.set(ChamaField::MaxMembers, "Maximum members is required"),
                    Some(n) if n < 3 => errors.set(ChamaField::MaxMembers, "Minimum 3 members required"),
                    Some(n) if n > 100 => {
                        errors.set(ChamaField::MaxMembers, "Maximum 100 members allowed")
                    }
                    Some(_) => {}
                }
            }
            WizardStep::GroupSettings | WizardStep::Review => {}
        }
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChamaWizard {
    pub draft: ChamaDraft,
    step: WizardStep,
    errors: FieldErrors<ChamaField>,
}

impl ChamaWizard {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn errors(&self) -> &FieldErrors<ChamaField> {
        &self.errors
    }

    pub fn clear_error(&mut self, field: ChamaField) {
        self.errors.clear(field);
    }

    pub fn is_last_step(&self) -> bool {
        self.step == WizardStep::Review
    }

    /// Advance if the current step validates. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        self.errors = self.draft.validate_step(self.step);
        if !self.errors.is_empty() {
            return false;
        }
        match self.step.next() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn prev(&mut self) -> bool {
        match self.step.prev() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Jump straight to `target`. Going back is always allowed; going forward only
    /// when every step before `target` validates.
    pub fn jump_to(&mut self, target: WizardStep) -> bool {
        if target <= self.step {
            self.step = target;
            return true;
        }
        for step in WizardStep::ALL.into_iter().take_while(|s| *s < target) {
            let errors = self.draft.validate_step(step);
            if !errors.is_empty() {
                self.step = step;
                self.errors = errors;
                return false;
            }
        }
        self.errors = FieldErrors::default();
        self.step = target;
        true
    }

    /// The creation request, once every step validates.
    pub fn submission(&self) -> Result<NewChama, (WizardStep, FieldErrors<ChamaField>)> {
        for step in WizardStep::ALL {
            let errors = self.draft.validate_step(step);
            if !errors.is_empty() {
                return Err((step, errors));
            }
        }
        let draft = &self.draft;
        Ok(NewChama {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            contribution_amount: draft.amount().map(whole_shillings).unwrap_or_default(),
            contribution_frequency: draft.contribution_frequency,
            chama_type: draft.chama_type,
            max_members: draft.members().unwrap_or_default(),
            is_public: draft.is_public,
            require_approval: draft.require_approval,
            enable_ai: draft.enable_ai,
        })
    }

    /// Point the wizard at the first failing step after a refused submission.
    pub fn show_errors(&mut self, step: WizardStep, errors: FieldErrors<ChamaField>) {
        self.step = step;
        self.errors = errors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ChamaWizard {
        let mut wizard = ChamaWizard::default();
        wizard.draft.name = "Umoja Savings".into();
        wizard.draft.description = "Monthly savings for the estate".into();
        wizard.draft.contribution_amount = "5000".into();
        wizard.draft.max_members = "25".into();
        wizard
    }

    #[test]
    fn test_next_is_gated_by_step_rules() {
        let mut wizard = ChamaWizard::default();
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::BasicInformation);
        assert_eq!(wizard.errors().get(ChamaField::Name), Some("Chama name is required"));

        wizard.draft.name = "Um".into();
        wizard.draft.description = "Too short".into();
        assert!(!wizard.next());
        assert_eq!(
            wizard.errors().get(ChamaField::Name),
            Some("Name must be at least 3 characters")
        );
        assert_eq!(
            wizard.errors().get(ChamaField::Description),
            Some("Description must be at least 10 characters")
        );

        wizard.draft.name = "Umoja".into();
        wizard.draft.description = "Monthly savings".into();
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::FinancialSettings);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn test_financial_bounds() {
        let mut draft = filled().draft;
        for (amount, message) in [
            ("99", Some("Minimum contribution is KES 100")),
            ("99.6", Some("Minimum contribution is KES 100")),
            ("1000000.4", Some("Maximum contribution is KES 1,000,000")),
            ("1000001", Some("Maximum contribution is KES 1,000,000")),
            ("", Some("Valid contribution amount is required")),
            ("100", None),
            ("1000000", None),
        ] {
            draft.contribution_amount = amount.into();
            let errors = draft.validate_step(WizardStep::FinancialSettings);
            assert_eq!(errors.get(ChamaField::ContributionAmount), message, "{amount}");
        }
        draft.contribution_amount = "5000".into();
        for (members, message) in [
            ("2", Some("Minimum 3 members required")),
            ("101", Some("Maximum 100 members allowed")),
            ("many", Some("Maximum members is required")),
            ("3", None),
            ("100", None),
        ] {
            draft.max_members = members.into();
            let errors = draft.validate_step(WizardStep::FinancialSettings);
            assert_eq!(errors.get(ChamaField::MaxMembers), message, "{members}");
        }
    }

    #[test]
    fn test_walk_through_and_back() {
        let mut wizard = filled();
        assert!(wizard.next());
        assert!(wizard.next());
        assert!(wizard.next());
        assert!(wizard.is_last_step());
        assert!(!wizard.next());
        assert!(wizard.prev());
        assert_eq!(wizard.step(), WizardStep::GroupSettings);
        assert!(wizard.jump_to(WizardStep::BasicInformation));
        assert!(!wizard.prev());
    }

    #[test]
    fn test_jump_ahead_requires_earlier_steps() {
        let mut wizard = filled();
        wizard.draft.contribution_amount = "50".into();
        assert!(!wizard.jump_to(WizardStep::Review));
        assert_eq!(wizard.step(), WizardStep::FinancialSettings);
        assert!(wizard.errors().get(ChamaField::ContributionAmount).is_some());

        wizard.draft.contribution_amount = "500".into();
        assert!(wizard.jump_to(WizardStep::Review));
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn test_submission_matches_draft() {
        let mut wizard = filled();
        wizard.draft.chama_type = ChamaType::Investment;
        wizard.draft.contribution_frequency = ContributionFrequency::Weekly;
        wizard.draft.is_public = false;
        wizard.draft.require_approval = false;
        wizard.draft.enable_ai = false;

        let request = wizard.submission().unwrap();
        assert_eq!(
            request,
            NewChama {
                name: "Umoja Savings".into(),
                description: "Monthly savings for the estate".into(),
                contribution_amount: 5_000,
                contribution_frequency: ContributionFrequency::Weekly,
                chama_type: ChamaType::Investment,
                max_members: 25,
                is_public: false,
                require_approval: false,
                enable_ai: false,
            }
        );
    }

    #[test]
    fn test_submission_refused_on_invalid_draft() {
        let mut wizard = filled();
        wizard.draft.max_members = "1".into();
        let (step, errors) = wizard.submission().unwrap_err();
        assert_eq!(step, WizardStep::FinancialSettings);
        wizard.show_errors(step, errors);
        assert_eq!(wizard.step(), WizardStep::FinancialSettings);
        assert_eq!(
            wizard.errors().get(ChamaField::MaxMembers),
            Some("Minimum 3 members required")
        );
    }

    #[test]
    fn test_step_titles() {
        let titles: Vec<_> = WizardStep::ALL.iter().map(|s| s.title()).collect();
        assert_eq!(
            titles,
            ["Basic Information", "Financial Settings", "Group Settings", "Review & Create"]
        );
        assert_eq!(WizardStep::Review.number(), 4);
    }
}
