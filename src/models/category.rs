/// The eight fixed expense categories. Stored labels are the Hungarian
/// names used by the application's data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ExpenseCategory {
    Groceries,
    Entertainment,
    Dining,
    Extra,
    Travel,
    Mandatory,
    Clothing,
    Sport,
}

impl ExpenseCategory {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "Bevásárlás",
            Self::Entertainment => "Szórakozás",
            Self::Dining => "Vendéglátás",
            Self::Extra => "Extra",
            Self::Travel => "Utazás",
            Self::Mandatory => "Kötelező kiadás",
            Self::Clothing => "Ruha",
            Self::Sport => "Sport",
        }
    }

    /// Accepts the stored Hungarian label or an English alias. There is no
    /// catch-all category; unknown input is `None`.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bevásárlás" | "groceries" => Some(Self::Groceries),
            "szórakozás" | "entertainment" => Some(Self::Entertainment),
            "vendéglátás" | "dining" => Some(Self::Dining),
            "extra" => Some(Self::Extra),
            "utazás" | "travel" => Some(Self::Travel),
            "kötelező kiadás" | "mandatory" => Some(Self::Mandatory),
            "ruha" | "clothing" => Some(Self::Clothing),
            "sport" => Some(Self::Sport),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Groceries,
            Self::Entertainment,
            Self::Dining,
            Self::Extra,
            Self::Travel,
            Self::Mandatory,
            Self::Clothing,
            Self::Sport,
        ]
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Income source classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum IncomeSource {
    Salary,
    Transfer,
    Business,
    Other,
}

impl IncomeSource {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "Fizetés",
            Self::Transfer => "Utalás",
            Self::Business => "Vállalkozás",
            Self::Other => "Egyéb",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fizetés" | "salary" => Some(Self::Salary),
            "utalás" | "transfer" => Some(Self::Transfer),
            "vállalkozás" | "business" => Some(Self::Business),
            "egyéb" | "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [IncomeSource] {
        &[Self::Salary, Self::Transfer, Self::Business, Self::Other]
    }
}

impl std::fmt::Display for IncomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
