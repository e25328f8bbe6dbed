//! Organization commands

use tabled::Tabled;

use super::{id, Session};
use crate::output::or_dash;
use crate::{InstitutionCommands, OrgCommands};

#[derive(Tabled)]
struct InstitutionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: bool,
}

#[derive(Tabled)]
struct CostCenterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Directorate")]
    directorate: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Area ID")]
    area_id: String,
}

pub async fn handle(action: OrgCommands, session: &Session) -> Result<(), String> {
    let organizations = &session.engine.organizations;
    match action {
        OrgCommands::Institution { action: InstitutionCommands::Add { name } } => {
            let institution = organizations
                .create_institution(&name)
                .await
                .map_err(|e| e.to_string())?;
            println!("Created institution: {}", institution.id);
        }
        OrgCommands::Institution { action: InstitutionCommands::List } => {
            let institutions = organizations.list_institutions().await.map_err(|e| e.to_string())?;
            session.format.render(&institutions, |list| {
                list.iter()
                    .map(|i| InstitutionRow {
                        id: i.id.to_string(),
                        name: i.name.clone(),
                        active: i.active,
                    })
                    .collect()
            });
        }
        OrgCommands::Directorate { name } => {
            let institution = session.institution()?;
            let directorate = organizations
                .create_directorate(&institution, &name)
                .await
                .map_err(|e| e.to_string())?;
            println!("Created directorate: {}", directorate.id);
        }
        OrgCommands::Area { directorate, name } => {
            let area = organizations
                .create_area(&id(&directorate), &name)
                .await
                .map_err(|e| e.to_string())?;
            println!("Created area: {}", area.id);
        }
        OrgCommands::CostCenter { code, name } => {
            let institution = session.institution()?;
            let cost_center = organizations
                .create_cost_center(&institution, &name, code)
                .await
                .map_err(|e| e.to_string())?;
            println!("Created cost center: {}", cost_center.id);
        }
        OrgCommands::CostCenters => {
            let institution = session.institution()?;
            let centers = organizations
                .list_cost_centers(&institution)
                .await
                .map_err(|e| e.to_string())?;
            session.format.render(&centers, |list| {
                list.iter()
                    .map(|c| CostCenterRow {
                        id: c.id.to_string(),
                        code: or_dash(c.code.as_deref()),
                        name: c.name.clone(),
                    })
                    .collect()
            });
        }
        OrgCommands::Units => {
            let institution = session.institution()?;
            let directory = organizations
                .directory(&institution)
                .await
                .map_err(|e| e.to_string())?;
            let units = directory.units();
            session.format.render(&units, |list| {
                list.iter()
                    .map(|u| UnitRow {
                        directorate: u.directorate_name.clone(),
                        area: u.area_name.clone(),
                        area_id: u.area_id.to_string(),
                    })
                    .collect()
            });
        }
    }
    Ok(())
}
