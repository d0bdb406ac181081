//! CSV-backed member profile repository.

use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, StringRecord, Writer};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, MEMBERS_HEADER};
use crate::domain::models::member::MemberProfile;
use crate::storage::traits::MemberStorage;

#[derive(Clone)]
pub struct MemberRepository {
    connection: CsvConnection,
}

impl MemberRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    async fn read_members(&self, group_id: &str) -> Result<Vec<MemberProfile>> {
        let file_path = self.connection.members_file_path(group_id);
        self.connection.ensure_file_exists(&file_path, MEMBERS_HEADER)?;

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut members = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            match Self::parse_record(&record) {
                Some(member) => members.push(member),
                None => warn!("Skipping malformed member row: {:?}", record),
            }
        }

        members.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        Ok(members)
    }

    async fn write_members(&self, group_id: &str, members: &[MemberProfile]) -> Result<()> {
        let file_path = self.connection.members_file_path(group_id);
        self.connection.ensure_file_exists(&file_path, MEMBERS_HEADER)?;
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(MEMBERS_HEADER.split(','))?;
            for member in members {
                csv_writer.write_record(&[
                    member.id.as_str(),
                    member.name.as_str(),
                    member.avatar_url.as_deref().unwrap_or(""),
                ])?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }

    fn parse_record(record: &StringRecord) -> Option<MemberProfile> {
        let avatar_field = record.get(2)?;
        Some(MemberProfile {
            id: record.get(0)?.to_string(),
            name: record.get(1)?.to_string(),
            avatar_url: if avatar_field.is_empty() {
                None
            } else {
                Some(avatar_field.to_string())
            },
        })
    }
}

#[async_trait]
impl MemberStorage for MemberRepository {
    async fn store_member(&self, group_id: &str, member: &MemberProfile) -> Result<()> {
        let mut members = self.read_members(group_id).await?;
        match members.iter_mut().find(|m| m.id == member.id) {
            Some(slot) => *slot = member.clone(),
            None => members.push(member.clone()),
        }
        members.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        self.write_members(group_id, &members).await
    }

    async fn get_member(&self, group_id: &str, member_id: &str) -> Result<Option<MemberProfile>> {
        let members = self.read_members(group_id).await?;
        Ok(members.into_iter().find(|m| m.id == member_id))
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<MemberProfile>> {
        self.read_members(group_id).await
    }
}
