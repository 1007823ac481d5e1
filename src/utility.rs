#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "rayon")]
#[inline]
pub(crate) fn into_par_iter<T: IntoParallelIterator>(iter: T) -> T::Iter {
    iter.into_par_iter()
}

#[cfg(not(feature = "rayon"))]
#[inline]
pub(crate) fn into_par_iter<T: IntoIterator>(iter: T) -> T::IntoIter {
    iter.into_iter()
}
