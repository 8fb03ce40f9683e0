use evidence::{
  client::HttpClient,
  retriever::{
    AclRetriever, ArxivRetriever, DocumentRequest, MaterialsRetriever, WikipediaRetriever,
  },
};

use super::*;

mod metadata;
