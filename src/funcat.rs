//src/funcat.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use crate::error::{CogError, Result};
use crate::types::CogFuncCategory;

/// The 26 COG functional categories shipped with the crate.
pub const BUNDLED_FUNC_CATEGORY: &str = include_str!("../resources/cog_func_category.tsv");

/// COG functional categories, keyed by letter and kept in file order.
#[derive(Debug, Clone)]
pub struct CogFuncCategoryTable {
    categories: Vec<CogFuncCategory>,
    letter_to_idx: AHashMap<String, usize>,
}

impl CogFuncCategoryTable {
    /// Parses a category file in the format:
    /// ```text
    /// <letter>\t<group>\t<color>\t<description>
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CogError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_reader(Cursor::new(BUNDLED_FUNC_CATEGORY), "<bundled cog_func_category.tsv>")
    }

    pub fn from_reader<R: BufRead, P: AsRef<Path>>(reader: R, source: P) -> Result<Self> {
        let source = source.as_ref();
        let mut categories = Vec::new();
        let mut letter_to_idx = AHashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| CogError::io(source, e))?;
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() != 4 {
                return Err(CogError::parse(
                    source,
                    idx + 1,
                    format!("expected 4 columns, found {}", parts.len()),
                ));
            }

            let category = CogFuncCategory {
                letter: parts[0].to_string(),
                group: parts[1].to_string(),
                color: parts[2].to_string(),
                desc: parts[3].to_string(),
            };
            if letter_to_idx
                .insert(category.letter.clone(), categories.len())
                .is_some()
            {
                return Err(CogError::parse(
                    source,
                    idx + 1,
                    format!("duplicate category letter '{}'", category.letter),
                ));
            }
            categories.push(category);
        }

        Ok(Self {
            categories,
            letter_to_idx,
        })
    }

    pub fn get(&self, letter: &str) -> Result<&CogFuncCategory> {
        self.letter_to_idx
            .get(letter)
            .map(|&i| &self.categories[i])
            .ok_or_else(|| CogError::KeyNotFound {
                table: "COG functional category",
                key: letter.to_string(),
            })
    }

    pub fn all(&self) -> &[CogFuncCategory] {
        &self.categories
    }

    pub fn letters(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.letter.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for c in &self.categories {
            out.push_str(&c.as_tsv());
            out.push('\n');
        }
        out
    }
}
