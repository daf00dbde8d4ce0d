//! Job catalog loading
//!
//! Reads a CSV table with one row per job. Required columns are the index
//! column, the stat columns, the crystal column and the style column. Every
//! other column is a boolean equipment column, kept in file order.

use fiesta_core::{Crystal, Error, Job, JobCatalog, Result, Style, Unlock};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Crystal value used for jobs outside the crystal progression
pub const MISC_CRYSTAL: &str = "Misc";

/// Column names and the basic job for a catalog file
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogOptions {
    pub index_column: String,
    pub stat_columns: Vec<String>,
    pub crystal_column: String,
    pub style_column: String,
    /// Job every character falls back to; its `Misc` crystal means always available
    pub basic_job: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            index_column: "Job".to_string(),
            stat_columns: ["Strength", "Agility", "Vitality", "Magic"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            crystal_column: "Crystal".to_string(),
            style_column: "Style".to_string(),
            basic_job: "Freelancer".to_string(),
        }
    }
}

impl CatalogOptions {
    pub fn with_basic_job(mut self, job: impl Into<String>) -> Self {
        self.basic_job = job.into();
        self
    }

    pub fn with_stat_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stat_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Unlock rule for a crystal cell: the four crystals map directly,
    /// `Always`/`Late` are taken literally, and `Misc` means always available
    /// for the basic job and late for anything else.
    fn parse_unlock(&self, job: &str, value: &str) -> Result<Unlock> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(MISC_CRYSTAL) {
            return Ok(if job == self.basic_job {
                Unlock::Always
            } else {
                Unlock::Late
            });
        }
        if value.eq_ignore_ascii_case("Always") {
            return Ok(Unlock::Always);
        }
        if value.eq_ignore_ascii_case("Late") {
            return Ok(Unlock::Late);
        }
        value.parse::<Crystal>().map(Unlock::Crystal)
    }
}

/// Load a job catalog from a CSV file
pub fn load_catalog<P: AsRef<Path>>(path: P, options: &CatalogOptions) -> Result<JobCatalog> {
    let path = path.as_ref();
    let catalog = read_catalog(File::open(path)?, options)?;
    info!(
        path = %path.display(),
        jobs = catalog.len(),
        equipment = catalog.num_equipment(),
        "loaded job catalog"
    );
    Ok(catalog)
}

/// Read a job catalog from any CSV source
pub fn read_catalog<R: Read>(reader: R, options: &CatalogOptions) -> Result<JobCatalog> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let mut missing = Vec::new();
    let mut require = |name: &str| {
        let found = column(name);
        if found.is_none() {
            missing.push(name.to_string());
        }
        found.unwrap_or(usize::MAX)
    };
    let index_col = require(&options.index_column);
    let stat_cols: Vec<usize> = options.stat_columns.iter().map(|c| require(c)).collect();
    let crystal_col = require(&options.crystal_column);
    let style_col = require(&options.style_column);
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut reserved = vec![index_col, crystal_col, style_col];
    reserved.extend(&stat_cols);
    let equipment_cols: Vec<usize> = (0..headers.len()).filter(|i| !reserved.contains(i)).collect();

    let mut jobs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let field = |col: usize| record.get(col).unwrap_or("");
        let id = field(index_col).to_string();

        let stats = stat_cols
            .iter()
            .map(|&col| {
                field(col).parse::<f32>().map_err(|_| {
                    Error::InvalidConfig(format!(
                        "row {}: column '{}' of job '{}' is not a number: '{}'",
                        row + 1,
                        &headers[col],
                        id,
                        field(col)
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let equipment = equipment_cols
            .iter()
            .map(|&col| {
                parse_bool(field(col)).ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "row {}: column '{}' of job '{}' is not a boolean: '{}'",
                        row + 1,
                        &headers[col],
                        id,
                        field(col)
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let unlock = options.parse_unlock(&id, field(crystal_col))?;
        let style = field(style_col).parse::<Style>()?;

        jobs.push(Job::new(id, unlock, style).with_stats(stats).with_equipment(equipment));
    }

    let equipment_columns = equipment_cols.iter().map(|&c| headers[c].to_string()).collect();
    JobCatalog::new(
        options.stat_columns.clone(),
        equipment_columns,
        jobs,
        &options.basic_job,
    )
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "x" => Some(true),
        "false" | "0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

pub(crate) fn csv_error(e: csv::Error) -> Error {
    Error::Persistence(format!("CSV error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOBS_CSV: &str = "\
Job,Strength,Agility,Vitality,Magic,Crystal,Style,Swords,Rods,Heavy Armor
Freelancer,0,0,0,0,Misc,Misc,True,False,False
Knight,10,-2,8,-5,Wind,Heavy,True,False,True
BlackMage,-3,0,-2,12,Water,Mage,False,True,False
Mime,2,2,2,2,Misc,Misc,False,False,False
";

    #[test]
    fn test_read_catalog() {
        let catalog = read_catalog(JOBS_CSV.as_bytes(), &CatalogOptions::default()).unwrap();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.equipment_columns(), &["Swords", "Rods", "Heavy Armor"]);
        assert_eq!(catalog.num_stats(), 4);

        let knight = catalog.get("Knight").unwrap();
        assert_eq!(knight.unlock, Unlock::Crystal(Crystal::Wind));
        assert_eq!(knight.style, Style::Heavy);
        assert_eq!(knight.stats, vec![10.0, -2.0, 8.0, -5.0]);
        assert_eq!(knight.equipment, vec![true, false, true]);
    }

    #[test]
    fn test_misc_crystal_depends_on_basic_job() {
        let catalog = read_catalog(JOBS_CSV.as_bytes(), &CatalogOptions::default()).unwrap();
        assert_eq!(catalog.get("Freelancer").unwrap().unlock, Unlock::Always);
        assert_eq!(catalog.get("Mime").unwrap().unlock, Unlock::Late);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "\
Rods,Crystal,Job,Style,Magic,Vitality,Agility,Strength
1,Misc,Freelancer,Misc,4,3,2,1
";
        let catalog = read_catalog(csv.as_bytes(), &CatalogOptions::default()).unwrap();
        let freelancer = catalog.basic_job();
        assert_eq!(freelancer.stats, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(catalog.equipment_columns(), &["Rods"]);
        assert_eq!(freelancer.equipment, vec![true]);
    }

    #[test]
    fn test_missing_columns() {
        let csv = "Job,Strength,Agility,Style\nFreelancer,0,0,Misc\n";
        let err = read_catalog(csv.as_bytes(), &CatalogOptions::default()).unwrap_err();
        match err {
            Error::MissingColumns(missing) => {
                assert_eq!(missing, vec!["Vitality", "Magic", "Crystal"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bad_cells() {
        let bad_number = JOBS_CSV.replace("Knight,10", "Knight,ten");
        assert!(matches!(
            read_catalog(bad_number.as_bytes(), &CatalogOptions::default()),
            Err(Error::InvalidConfig(_))
        ));

        let bad_bool = JOBS_CSV.replace("Wind,Heavy,True", "Wind,Heavy,maybe");
        assert!(matches!(
            read_catalog(bad_bool.as_bytes(), &CatalogOptions::default()),
            Err(Error::InvalidConfig(_))
        ));

        let bad_crystal = JOBS_CSV.replace("Water,Mage", "Lightning,Mage");
        assert!(read_catalog(bad_crystal.as_bytes(), &CatalogOptions::default()).is_err());
    }

    #[test]
    fn test_missing_basic_job() {
        let options = CatalogOptions::default().with_basic_job("Bard");
        let err = read_catalog(JOBS_CSV.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, Error::UnknownJob(job) if job == "Bard"));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        std::fs::write(&path, JOBS_CSV).unwrap();

        let catalog = load_catalog(&path, &CatalogOptions::default()).unwrap();
        assert_eq!(catalog.position("BlackMage").unwrap(), 2);

        assert!(matches!(
            load_catalog(dir.path().join("absent.csv"), &CatalogOptions::default()),
            Err(Error::Io(_))
        ));
    }
}
