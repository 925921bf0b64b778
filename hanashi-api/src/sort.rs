#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Username,
    Email,
    CreatedAt,
}

impl SortField {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Username => "username",
            SortField::Email => "email",
            SortField::CreatedAt => "created_at",
        }
    }

    pub fn from_param(s: &str) -> Option<SortField> {
        match s {
            "username" => Some(SortField::Username),
            "email" => Some(SortField::Email),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn from_param(s: &str) -> Option<SortOrder> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Which field the API sorts root comments by, and in which direction
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortState {
    fn default() -> SortState {
        SortState {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl SortState {
    /// Clicking the current field flips the order, clicking another one
    /// switches to it in descending order
    pub fn toggle(self, field: SortField) -> SortState {
        match self.field == field {
            true => SortState {
                field,
                order: self.order.flipped(),
            },
            false => SortState {
                field,
                order: SortOrder::Desc,
            },
        }
    }

    /// Arrow to display next to the button for `field`, if it is the active one
    pub fn indicator(&self, field: SortField) -> Option<&'static str> {
        (self.field == field).then(|| match self.order {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        })
    }

    pub fn query_params(&self) -> [(&'static str, &'static str); 2] {
        [
            ("sort_by", self.field.as_param()),
            ("order", self.order.as_param()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle() {
        let s = SortState::default();
        assert_eq!(s.field, SortField::CreatedAt);
        assert_eq!(s.order, SortOrder::Desc);

        let s = s.toggle(SortField::CreatedAt);
        assert_eq!(s.order, SortOrder::Asc);

        let s = s.toggle(SortField::Email);
        assert_eq!(
            s,
            SortState {
                field: SortField::Email,
                order: SortOrder::Desc,
            }
        );
        assert_eq!(s.toggle(SortField::Email).order, SortOrder::Asc);
    }

    #[test]
    fn indicator() {
        let s = SortState::default();
        assert_eq!(s.indicator(SortField::CreatedAt), Some("↓"));
        assert_eq!(s.indicator(SortField::Username), None);
        let s = s.toggle(SortField::CreatedAt);
        assert_eq!(s.indicator(SortField::CreatedAt), Some("↑"));
    }

    #[test]
    fn params() {
        let s = SortState::default().toggle(SortField::Username);
        assert_eq!(s.query_params(), [("sort_by", "username"), ("order", "desc")]);
        assert_eq!(SortField::from_param("created_at"), Some(SortField::CreatedAt));
        assert_eq!(SortField::from_param("text"), None);
        assert_eq!(SortOrder::from_param("asc"), Some(SortOrder::Asc));
    }
}
