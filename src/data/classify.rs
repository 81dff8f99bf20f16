use super::model::{ColumnKind, Dataset};

/// The bucket a column falls into for the chart pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Numeric,
    Categorical,
}

impl Role {
    pub fn of(kind: ColumnKind) -> Option<Role> {
        match kind {
            ColumnKind::Integer | ColumnKind::Float => Some(Role::Numeric),
            ColumnKind::Text | ColumnKind::Category => Some(Role::Categorical),
            ColumnKind::Boolean | ColumnKind::DateTime => None,
        }
    }
}

/// Numeric and categorical column names, in file order. Booleans and
/// dates are in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Classification {
    pub fn role(&self, column: &str) -> Option<Role> {
        if self.numeric.iter().any(|c| c == column) {
            Some(Role::Numeric)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(Role::Categorical)
        } else {
            None
        }
    }

    /// Numeric columns followed by categorical ones, the primary-feature
    /// choices of the comparison view.
    pub fn comparable(&self) -> Vec<String> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .cloned()
            .collect()
    }
}

pub fn classify(dataset: &Dataset) -> Classification {
    let mut classification = Classification::default();
    for column in &dataset.columns {
        match Role::of(column.kind) {
            Some(Role::Numeric) => classification.numeric.push(column.name.clone()),
            Some(Role::Categorical) => classification.categorical.push(column.name.clone()),
            None => {}
        }
    }
    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn column(name: &str, kind: ColumnKind) -> Column {
        Column::new(name, kind, vec![CellValue::Null])
    }

    #[test]
    fn partitions_by_declared_kind() {
        let ds = Dataset::new(
            "t",
            vec![
                column("i", ColumnKind::Integer),
                column("s", ColumnKind::Text),
                column("f", ColumnKind::Float),
                column("b", ColumnKind::Boolean),
                column("c", ColumnKind::Category),
                column("d", ColumnKind::DateTime),
            ],
        );
        let cls = classify(&ds);
        assert_eq!(cls.numeric, vec!["i", "f"]);
        assert_eq!(cls.categorical, vec!["s", "c"]);
        assert_eq!(cls.role("d"), None);
        assert_eq!(cls.role("c"), Some(Role::Categorical));
        assert_eq!(cls.comparable(), vec!["i", "f", "s", "c"]);
    }

    #[test]
    fn every_column_is_in_at_most_one_bucket() {
        let ds = crate::data::loader::load_csv(
            "a,b,c,d\n1,x,true,2.5\n2,y,false,\n".as_bytes(),
            "t.csv",
        )
        .unwrap();
        let cls = classify(&ds);
        for name in ds.column_names() {
            let in_numeric = cls.numeric.contains(&name);
            let in_categorical = cls.categorical.contains(&name);
            assert!(!(in_numeric && in_categorical), "{name} in both buckets");
            let kind = ds.column(&name).unwrap().kind;
            assert_eq!(in_numeric || in_categorical, Role::of(kind).is_some());
        }
    }
}
