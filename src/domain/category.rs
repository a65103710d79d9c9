use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Category {
    Entertainment,
    Education,
    Productivity,
    Health,
    Other,
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Education => "Education",
            Category::Productivity => "Productivity",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "Entertainment" => Ok(Category::Entertainment),
            "Education" => Ok(Category::Education),
            "Productivity" => Ok(Category::Productivity),
            "Health" => Ok(Category::Health),
            "Other" => Ok(Category::Other),
            other => Err(format!("`{other}` is not a valid category")),
        }
    }
}
